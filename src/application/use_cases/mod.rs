mod answer_question;
mod index_documents;
mod retrieve_documents;

pub use answer_question::*;
pub use index_documents::*;
pub use retrieve_documents::*;

mod answer_generator;
mod embedding_service;
mod vector_index;

pub use answer_generator::*;
pub use embedding_service::*;
pub use vector_index::*;

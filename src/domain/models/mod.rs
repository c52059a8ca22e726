mod document;
mod embedding;
mod vector_match;

pub use document::*;
pub use embedding::*;
pub use vector_match::*;

mod gemini_embedding;
mod gemini_generator;
mod in_memory_vector_index;
mod mock_embedding;
mod mock_generator;
mod pinecone_vector_index;

pub use gemini_embedding::*;
pub use gemini_generator::*;
pub use in_memory_vector_index::*;
pub use mock_embedding::*;
pub use mock_generator::*;
pub use pinecone_vector_index::*;

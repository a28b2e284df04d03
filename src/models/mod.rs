pub mod document;
pub mod qa_pair;

pub use document::{Document, ImageFormat, MediaType};
pub use qa_pair::QaPair;

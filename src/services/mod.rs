pub mod llm_service;
pub mod paragraph_service;
pub mod question_service;
pub mod summary_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use llm_service::{CompletionService, LlmService};
pub use paragraph_service::ParagraphSegmenter;
pub use question_service::{parse_qa_response, QuestionGenerator};
pub use summary_service::Summarizer;

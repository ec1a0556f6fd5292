//! Summarize grouped news headlines with an OpenAI-compatible chat API.

pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod llm;
pub mod prompts;

pub use domain::{GroupStat, TitleEntry};
pub use error::SummaryError;
pub use infra::config::Language;
pub use llm::SummaryClient;

pub mod client;
pub mod summarizer;

pub use client::{ChatMessage, ChatRequest, ChatTransport, HttpResponse, HttpTransport};
pub use summarizer::SummaryClient;

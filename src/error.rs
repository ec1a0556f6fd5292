use thiserror::Error;

/// Why a summary request failed.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("{}", status_message(.status, .body))]
    Status { status: u16, body: String },

    #[error("Failed to reach chat API: {0}")]
    Transport(String),

    #[error("Failed to parse chat API response: {0}")]
    Decode(String),

    #[error("No choices in chat API response")]
    EmptyChoices,

    #[error("No message content in chat API response")]
    MissingContent,
}

fn status_message(status: &u16, body: &str) -> String {
    match *status {
        401 => "Invalid API key".to_string(),
        402 => "Insufficient balance on the API account".to_string(),
        429 => "Rate limit exceeded. Please try again later".to_string(),
        500..=599 => format!("Chat API server error ({})", status),
        _ => format!("Chat API error ({}): {}", status, body),
    }
}

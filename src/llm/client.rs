use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::error::SummaryError;

/// Upper bound on a single chat-completion call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one chat-completion payload and hands back the raw response.
///
/// Status handling and body parsing stay with the caller, so fakes only
/// have to produce a status and a body.
pub trait ChatTransport: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        payload: &ChatRequest,
    ) -> Result<HttpResponse, SummaryError>;
}

/// Blocking `reqwest` transport. Idle connections are not kept, so every
/// call opens its own connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client ({}), using reqwest defaults", e);
                Client::new()
            });

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTransport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        payload: &ChatRequest,
    ) -> Result<HttpResponse, SummaryError> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(payload)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .map_err(|e| SummaryError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| SummaryError::Transport(format!("failed to read body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

/// Extract the first choice's message content from a chat-completion response.
pub fn parse_chat_response(response: &HttpResponse) -> Result<String, SummaryError> {
    if !(200..300).contains(&response.status) {
        return Err(SummaryError::Status {
            status: response.status,
            body: response.body.clone(),
        });
    }

    let parsed: ChatResponse = serde_json::from_str(&response.body)
        .map_err(|e| SummaryError::Decode(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or(SummaryError::EmptyChoices)?
        .message
        .content
        .ok_or(SummaryError::MissingContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn request_serializes_in_chat_format() {
        let request = ChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            stream: false,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn first_choice_is_returned_verbatim() {
        let body = r#"{"id":"x","choices":[
            {"index":0,"message":{"role":"assistant","content":"  **one**\n"}},
            {"index":1,"message":{"role":"assistant","content":"two"}}
        ]}"#;

        assert_eq!(parse_chat_response(&ok(body)).unwrap(), "  **one**\n");
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(matches!(
            parse_chat_response(&ok("not json")),
            Err(SummaryError::Decode(_))
        ));
        assert!(matches!(
            parse_chat_response(&ok(r#"{"error":"nope"}"#)),
            Err(SummaryError::Decode(_))
        ));
        assert!(matches!(
            parse_chat_response(&ok(r#"{"choices":[]}"#)),
            Err(SummaryError::EmptyChoices)
        ));
        assert!(matches!(
            parse_chat_response(&ok(r#"{"choices":[{"message":{"content":null}}]}"#)),
            Err(SummaryError::MissingContent)
        ));
        assert!(matches!(
            parse_chat_response(&ok(r#"{"choices":[{"message":{"role":"assistant"}}]}"#)),
            Err(SummaryError::MissingContent)
        ));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let response = HttpResponse {
            status: 500,
            body: r#"{"choices":[{"message":{"content":"X"}}]}"#.to_string(),
        };

        match parse_chat_response(&response) {
            Err(SummaryError::Status { status, .. }) => assert_eq!(status, 500),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

use std::fmt;
use tracing::{debug, info, warn};

use crate::domain::GroupStat;
use crate::error::SummaryError;
use crate::infra::config::{Language, UserConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::client::{
    parse_chat_response, ChatMessage, ChatRequest, ChatTransport, HttpTransport,
};
use crate::prompts::{render_prompt, system_prompt};

/// Turns grouped news statistics into a Markdown summary via a chat-completion API.
pub struct SummaryClient<T: ChatTransport = HttpTransport> {
    api_key: String,
    base_url: String,
    model: String,
    language: Language,
    transport: T,
}

impl SummaryClient<HttpTransport> {
    /// Client for the default endpoint and model. The key is not checked until a request is sent.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            language: Language::default(),
            transport: HttpTransport::new(),
        }
    }

    pub fn from_config(config: &UserConfig) -> Self {
        Self::new(config.api_key().unwrap_or_default())
            .with_base_url(&config.base_url)
            .with_model(&config.model)
            .with_language(config.language)
    }
}

impl<T: ChatTransport> SummaryClient<T> {
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = base_url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_transport<U: ChatTransport>(self, transport: U) -> SummaryClient<U> {
        SummaryClient {
            api_key: self.api_key,
            base_url: self.base_url,
            model: self.model,
            language: self.language,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// The user prompt that `summarize` would send, or `None` when there is nothing to send.
    pub fn build_prompt(&self, groups: &[GroupStat]) -> Option<String> {
        render_prompt(groups, self.language)
    }

    pub fn build_request(&self, prompt: impl Into<String>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(system_prompt(self.language)),
                ChatMessage::user(prompt),
            ],
            stream: false,
        }
    }

    /// Summarize `groups`, reporting failures to the caller.
    ///
    /// `Ok(None)` means there was nothing to summarize and no request was made.
    pub fn try_summarize(&self, groups: &[GroupStat]) -> Result<Option<String>, SummaryError> {
        let Some(prompt) = self.build_prompt(groups) else {
            debug!("No news titles to summarize");
            return Ok(None);
        };

        let request = self.build_request(prompt);
        let url = self.endpoint();

        info!("Requesting summary from {} ({})", self.model, url);
        let response = self.transport.post_json(&url, &self.api_key, &request)?;
        let content = parse_chat_response(&response)?;
        info!("Summary generated ({} chars)", content.chars().count());

        Ok(Some(content))
    }

    /// Summarize `groups`; an empty string means no summary, whether from
    /// empty input or a failed call.
    pub fn summarize(&self, groups: &[GroupStat]) -> String {
        match self.try_summarize(groups) {
            Ok(summary) => summary.unwrap_or_default(),
            Err(e) => {
                warn!("Chat API call failed: {}", e);
                String::new()
            }
        }
    }
}

impl<T: ChatTransport> fmt::Debug for SummaryClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("language", &self.language)
            .finish()
    }
}

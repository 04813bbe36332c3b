//! HTTP-backed semantic analyzer against an OpenAI-compatible
//! chat-completions API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use a11yscan_core::config::SemanticConfig;
use a11yscan_core::domain::{ContentDigest, SemanticViolation};

use crate::domain::{SemanticAnalyzer, SemanticError};
use crate::infrastructure::response_parser::ResponseParser;

const SYSTEM_PROMPT: &str = "\
You are an accessibility reviewer. You receive the text content of a web \
page and report issues that require language understanding, not DOM \
inspection. Respond with a JSON array only. Each element: {\"category\": \
one of [\"unclear-link-text\", \"uninformative-alt-text\", \
\"ambiguous-heading\", \"unclear-button-label\", \"missing-form-context\", \
\"unclear-error-message\", \"inconsistent-navigation\", \
\"complex-language\", \"uninformative-page-title\", \
\"unexplained-abbreviation\", \"sensory-only-instructions\"], \
\"severity\": one of [\"critical\", \"serious\", \"moderate\", \"minor\"], \
\"description\": string, \"recommendation\": string, \"examples\": \
array of strings quoted from the page}. Report an empty array when the \
page has no such issues.";

/// Semantic analyzer backed by an OpenAI-compatible chat endpoint.
pub struct HttpAnalyzer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_digest_bytes: usize,
    request_timeout: Duration,
}

impl HttpAnalyzer {
    pub fn new(config: &SemanticConfig) -> Result<Self, SemanticError> {
        let request_timeout = Duration::from_secs(config.request_timeout_seconds);
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SemanticError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_digest_bytes: config.max_digest_bytes,
            request_timeout,
        })
    }

    /// Override the base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn user_prompt(&self, digest: &ContentDigest) -> String {
        let bounded = digest.truncated(self.max_digest_bytes);
        let title = bounded.title.as_deref().unwrap_or("(no title)");
        let lang = bounded.lang.as_deref().unwrap_or("(unspecified)");
        format!(
            "Page title: {title}\nDeclared language: {lang}\n\nPage text:\n{}",
            bounded.text
        )
    }

    fn map_transport_error(&self, error: reqwest::Error) -> SemanticError {
        if error.is_timeout() {
            SemanticError::Timeout {
                seconds: self.request_timeout.as_secs(),
            }
        } else {
            SemanticError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl SemanticAnalyzer for HttpAnalyzer {
    async fn analyze(
        &self,
        digest: &ContentDigest,
    ) -> Result<Vec<SemanticViolation>, SemanticError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(self.user_prompt(digest)),
                },
            ],
            temperature: 0.0,
        };

        debug!(model = %request.model, "Sending semantic analysis request");

        let response = self
            .client
            .post(self.chat_url())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                429 => SemanticError::RateLimited {
                    retry_after,
                    message: text,
                },
                401 | 403 => SemanticError::Authentication(text),
                code if code >= 500 => SemanticError::ServiceUnavailable(text),
                code => SemanticError::InvalidRequest(format!("API error {code}: {text}")),
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| SemanticError::InvalidResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                SemanticError::InvalidResponse("Response contained no message content".to_string())
            })?;

        let violations: Vec<SemanticViolation> = ResponseParser::parse_json(&content)?;
        debug!(count = violations.len(), "Semantic analysis returned findings");
        Ok(violations)
    }
}

// === Chat API types ===

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

//! Remote text generation.
//!
//! [`TextGenerator`] is the seam between the workflow and the model API. The
//! production implementation, [`OpenAiGenerator`], speaks the OpenAI
//! chat-completions protocol over a blocking HTTP client; tests substitute
//! their own implementation.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::core::config::{API_KEY_ENV, Config};
use crate::core::error::DocgenError;

const GENERATE_SYSTEM_PROMPT: &str = "You are a technical documentation writer. \
Generate clear, comprehensive markdown documentation for the provided source code. \
Include: overview, functions/classes, parameters, return values, and usage examples.";

const CHECK_SYSTEM_PROMPT: &str = "You are a documentation reviewer. Compare the source code \
against the existing documentation. Report any inaccuracies, missing items, or outdated \
information. Be concise.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a technical writer. Generate a single concise \
paragraph summarizing what the provided source code does. Focus on purpose, key \
functionality, and important details.";

/// Text-in, text-out model operations used by the workflow.
///
/// Any failure (network, auth, quota, malformed response) is reported as an
/// error; callers do not retry.
pub trait TextGenerator {
    /// Markdown documentation for `source` (the contents of `filename`).
    fn generate(&self, source: &str, filename: &str) -> Result<String, DocgenError>;

    /// Free-form report on how well `existing_docs` still describe `source`.
    fn check_accuracy(&self, source: &str, existing_docs: &str) -> Result<String, DocgenError>;

    /// One-paragraph summary of `source`.
    fn summarize(&self, source: &str, filename: &str) -> Result<String, DocgenError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for OpenAI and API-compatible servers.
pub struct OpenAiGenerator {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiGenerator {
    /// Client bound to `config`. Each call may take up to
    /// `config.request_timeout` end to end.
    pub fn new(config: &Config) -> Result<Self, DocgenError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DocgenError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, DocgenError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DocgenError::MissingCredential(API_KEY_ENV.to_string()))
    }

    fn complete(&self, system: &str, user: String) -> Result<String, DocgenError> {
        // Credential is checked before any network activity.
        let api_key = self.api_key()?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(%url, model = %self.model, "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DocgenError::Remote(format!("API error ({}): {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| DocgenError::Remote(format!("failed to parse response: {}", e)))?;
        first_choice_text(parsed)
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, DocgenError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| DocgenError::Remote("response contained no message".to_string()))
}

impl TextGenerator for OpenAiGenerator {
    fn generate(&self, source: &str, filename: &str) -> Result<String, DocgenError> {
        self.complete(
            GENERATE_SYSTEM_PROMPT,
            format!(
                "Generate documentation for `{}`:\n\n```\n{}\n```",
                filename, source
            ),
        )
    }

    fn check_accuracy(&self, source: &str, existing_docs: &str) -> Result<String, DocgenError> {
        self.complete(
            CHECK_SYSTEM_PROMPT,
            format!(
                "Source code:\n```\n{}\n```\n\nExisting documentation:\n{}",
                source, existing_docs
            ),
        )
    }

    fn summarize(&self, source: &str, filename: &str) -> Result<String, DocgenError> {
        self.complete(
            SUMMARY_SYSTEM_PROMPT,
            format!("Summarize `{}`:\n\n```\n{}\n```", filename, source),
        )
    }
}

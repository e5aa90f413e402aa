use std::error::Error as _;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::settings::Settings;

pub const COMPLETIONS_PATH: &str = "/api/v0/completions";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The JSON body posted to the completions endpoint.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
struct Response {
    // Absent is treated like empty.
    #[serde(default)]
    choices: Vec<Choice>,

    usage: Option<ResponseUsage>,
}

// Fields may be absent or explicitly null; both read as the zero value.
#[derive(Debug, Deserialize)]
struct Choice {
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ResponseUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

/// Token accounting reported by the server for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl From<ResponseUsage> for Usage {
    fn from(usage: ResponseUsage) -> Self {
        Usage {
            prompt_tokens: usage.prompt_tokens.unwrap_or_default(),
            completion_tokens: usage.completion_tokens.unwrap_or_default(),
            total_tokens: usage.total_tokens.unwrap_or_default(),
        }
    }
}

/// The generated text plus its usage numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Usage,
}

/// `ApiClient` sends plain (non-chat) completion requests to an LM Studio server.
///
/// Each call to [`ApiClient::complete`] is a single POST with no retries. The
/// client never exits the process or prints anything; every outcome comes back
/// as a [`Result`] so callers can decide how to report it.
pub struct ApiClient {
    settings: Settings,
    client: Client,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: Settings) -> Result<Self> {
        Self::with_timeout(settings, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(settings: Settings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ApiClient {
            settings,
            client,
            timeout,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Requests a completion of `prompt` from the configured model.
    ///
    /// # Returns:
    /// - `Ok(Completion)` with the first choice's text and the usage counts
    ///   (zero for anything the server left out).
    /// - `Err` with a connection, timeout, HTTP status or response format
    ///   failure. Nothing is retried.
    pub async fn complete(
        &self,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Completion> {
        let url = self.settings.completions_url();
        let body = self.build_request_body(prompt, temperature, max_tokens);
        debug!(%url, model = body.model, temperature, max_tokens, "sending completion request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e, &url))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| self.classify(e, &url))?;
        debug!(status = status.as_u16(), bytes = response_text.len(), "received response");

        if !status.is_success() {
            warn!(status = status.as_u16(), "completion request rejected");
            return Err(Error::Http {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let completion = parse_completion(&response_text)?;
        debug!(?completion.usage, "completion finished");
        Ok(completion)
    }

    fn build_request_body<'a>(
        &'a self,
        prompt: &'a str,
        temperature: f64,
        max_tokens: u32,
    ) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.settings.model,
            prompt,
            temperature,
            max_tokens,
            stream: false,
        }
    }

    // A connect timeout reports as both, so the timeout check has to go first.
    fn classify(&self, err: reqwest::Error, url: &str) -> Error {
        if err.is_timeout() {
            Error::TimedOut {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else if err.is_connect() {
            Error::ConnectionFailed {
                url: url.to_string(),
            }
        } else {
            let mut message = format!("Request to {} failed: {}", url, err);
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!(": {}", cause));
                source = cause.source();
            }
            Error::Other(message)
        }
    }
}

fn parse_completion(response_text: &str) -> Result<Completion> {
    let response = serde_json::from_str::<Response>(response_text)
        .map_err(|e| Error::MalformedResponse(format!("{}\nRaw JSON: {}", e, response_text)))?;

    let usage = response.usage.unwrap_or_default().into();
    match response.choices.into_iter().next() {
        Some(choice) => Ok(Completion {
            text: choice.text.unwrap_or_default(),
            usage,
        }),
        None => Err(Error::MalformedResponse(
            "response contained no choices".to_string(),
        )),
    }
}

use std::env;
use std::num::NonZeroU16;

use tracing::debug;

use crate::api::{COMPLETIONS_PATH, DEFAULT_MAX_TOKENS};
use crate::error::{Error, Result};

pub const HOST_VAR: &str = "LM_STUDIO_HOST";
pub const PORT_VAR: &str = "LM_STUDIO_PORT";
pub const MODEL_VAR: &str = "LM_STUDIO_MODEL";
pub const MAX_TOKENS_VAR: &str = "LM_STUDIO_MAX_TOKENS";

/// Connection and generation defaults for talking to the LM Studio server.
///
/// Built once at startup and handed to [`crate::ApiClient`]; nothing reads the
/// environment after that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: NonZeroU16,
    pub model: String,
    pub default_max_tokens: u32,
}

impl Settings {
    /// Loads settings from the process environment, after merging in a `.env`
    /// file from the current directory or one of its parents if there is one.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::Other(format!("Failed to load .env file: {}", e))),
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as absent ones. All missing required
    /// keys are reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let host = read(HOST_VAR);
        let port = read(PORT_VAR);
        let model = read(MODEL_VAR);

        let missing: Vec<&'static str> = [(HOST_VAR, &host), (PORT_VAR, &port), (MODEL_VAR, &model)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect();

        let (Some(host), Some(port), Some(model)) = (host, port, model) else {
            return Err(Error::MissingConfig(missing));
        };

        let port = parse_port(&port)?;

        let default_max_tokens = match read(MAX_TOKENS_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::InvalidMaxTokens(raw))?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Settings {
            host,
            port,
            model,
            default_max_tokens,
        })
    }

    /// The full URL of the completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, COMPLETIONS_PATH)
    }

    /// An explicit limit wins over the configured default.
    pub fn resolve_max_tokens(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_max_tokens)
    }
}

fn parse_port(raw: &str) -> Result<NonZeroU16> {
    raw.trim()
        .parse::<NonZeroU16>()
        .map_err(|_| Error::InvalidPort(raw.to_string()))
}

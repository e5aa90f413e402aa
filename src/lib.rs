//! Query a local LM Studio server's completions endpoint.
//!
//! [`Settings`] are read once from the environment, then handed to an
//! [`ApiClient`] which performs a single request per call.

pub mod api;
pub mod error;
pub mod logging;
pub mod report;
pub mod settings;

pub use api::{ApiClient, Completion, CompletionRequest, Usage};
pub use error::{Error, Result};
pub use settings::Settings;

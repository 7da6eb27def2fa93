//! Text-generation providers.
//!
//! Callers talk to a [`TextGenerator`]; [`gemini::GeminiClient`] is the only
//! production implementation.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::{GeminiClient, GenerationConfig};

/// Prefix used when a failed reply is rendered as chat text.
pub const ERROR_PREFIX: &str = "Error: ";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured")]
    NotConfigured,

    /// Carries no request URL; see the `From` impl.
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    #[error("gemini error: {status}\n{body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{0}")]
    Runtime(String),
}

impl From<reqwest::Error> for ProviderError {
    // Request URLs never reach logs or the transcript.
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.without_url())
    }
}

/// A single-shot prompt-in, text-out model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Set the credential. A blank key leaves the generator unconfigured.
    fn configure(&mut self, api_key: &str);

    /// Whether a credential is present. Unconfigured generators never touch the network.
    fn is_configured(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Blocking variant of [`generate`](Self::generate).
    ///
    /// Drives the async call on a private runtime, so it must not be called
    /// from inside a tokio runtime.
    fn generate_blocking(&self, prompt: &str) -> Result<String, ProviderError> {
        if !self.is_configured() {
            return Err(ProviderError::NotConfigured);
        }
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| ProviderError::Runtime(format!("Failed to start async runtime: {}", e)))?;
        rt.block_on(self.generate(prompt))
    }
}

/// Render a reply the way the transcript shows it: the text itself, or
/// `"Error: <message>"`.
pub fn reply_text(result: Result<String, ProviderError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}

//! Language analytics: key phrase and entity extraction for free text.
//!
//! The service is an external oracle. Handlers depend on [`TextAnalytics`]
//! so tests can run without network access.

pub mod azure;

use serde::{Deserialize, Serialize};

pub use azure::AzureTextAnalytics;

#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    /// The HTTP request to the analytics service failed.
    #[error("language request failed: {0}")]
    Request(String),

    /// The analytics service returned a non-success status.
    #[error("language service responded with status {status}: {body}")]
    Response { status: u16, body: String },

    /// The response body could not be parsed.
    #[error("language response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A named entity found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub category: String,
}

#[async_trait::async_trait]
pub trait TextAnalytics: Send + Sync {
    /// # Errors
    ///
    /// Transport, status, or parse failure.
    async fn key_phrases(&self, text: &str) -> Result<Vec<String>, LanguageError>;

    /// # Errors
    ///
    /// Transport, status, or parse failure.
    async fn entities(&self, text: &str) -> Result<Vec<Entity>, LanguageError>;
}

//! Azure AI Language text analytics (REST v3.1).
//!
//! Each call submits the text as a single document. A document-level error
//! (unsupported language, text too long) yields an empty result rather than
//! failing the request; it is logged at `warn`.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::{Entity, LanguageError, TextAnalytics};
use crate::config::LanguageConfig;

const API_PATH: &str = "/text/analytics/v3.1";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const DOCUMENT_ID: &str = "1";
const DOCUMENT_LANGUAGE: &str = "en";

pub struct AzureTextAnalytics {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AzureTextAnalytics {
    /// # Errors
    ///
    /// [`LanguageError::HttpClientBuild`] if the reqwest client cannot be built.
    pub fn new(config: LanguageConfig) -> Result<Self, LanguageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LanguageError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: config.endpoint, api_key: config.api_key })
    }

    async fn analyze<T>(&self, operation: &str, text: &str, field: &str) -> Result<T, LanguageError>
    where
        T: DeserializeOwned + Default,
    {
        let url = format!("{}{API_PATH}/{operation}", self.endpoint);
        let body = AnalyzeRequest {
            documents: [Document { id: DOCUMENT_ID, language: DOCUMENT_LANGUAGE, text }],
        };
        let response = self
            .http
            .post(url)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LanguageError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LanguageError::Request(e.to_string()))?;
        if status != 200 {
            return Err(LanguageError::Response { status, body: text });
        }
        first_document_field(&text, field)
    }
}

#[async_trait::async_trait]
impl TextAnalytics for AzureTextAnalytics {
    async fn key_phrases(&self, text: &str) -> Result<Vec<String>, LanguageError> {
        self.analyze("keyPhrases", text, "keyPhrases").await
    }

    async fn entities(&self, text: &str) -> Result<Vec<Entity>, LanguageError> {
        self.analyze("entities/recognition/general", text, "entities")
            .await
    }
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    documents: [Document<'a>; 1],
}

#[derive(Serialize)]
struct Document<'a> {
    id: &'a str,
    language: &'a str,
    text: &'a str,
}

/// Pull `documents[0].<field>` out of a batch response. Extra fields on each
/// element (offsets, confidence scores) are ignored by `T`'s deserializer.
pub(crate) fn first_document_field<T>(json_text: &str, field: &str) -> Result<T, LanguageError>
where
    T: DeserializeOwned + Default,
{
    let mut root: Value = serde_json::from_str(json_text).map_err(|e| LanguageError::Parse(e.to_string()))?;

    if let Some(message) = root
        .pointer("/errors/0/error/message")
        .and_then(Value::as_str)
    {
        warn!(error = message, "language document rejected");
        return Ok(T::default());
    }

    let Some(value) = root
        .pointer_mut(&format!("/documents/0/{field}"))
        .map(Value::take)
    else {
        return Err(LanguageError::Parse(format!("missing documents[0].{field}")));
    };
    serde_json::from_value(value).map_err(|e| LanguageError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "azure_test.rs"]
mod tests;

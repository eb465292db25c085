//! Azure Blob REST client authenticated with Shared Key.
//!
//! DESIGN
//! ======
//! Only the three calls the upload flow needs are implemented: create
//! container, put block blob, and a locally computed read SAS. Each REST
//! request is signed per the Shared Key scheme (HMAC over verb, standard
//! headers, canonicalized `x-ms-*` headers and resource). Nothing is cached
//! between calls apart from the `reqwest::Client`.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, info};
use url::Url;

use super::sas::{BlobSas, SERVICE_VERSION, SharedKeyCredential};
use super::{BlobStore, StorageError};

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Well-known Azurite development account.
const DEV_ACCOUNT: &str = "devstoreaccount1";
const DEV_KEY: &str = "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

// =============================================================================
// CONNECTION STRING
// =============================================================================

/// Storage account resolved from a connection string.
#[derive(Debug, Clone)]
pub struct StorageAccount {
    pub credential: SharedKeyCredential,
    pub blob_endpoint: Url,
}

impl StorageAccount {
    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// Recognized keys: `AccountName`, `AccountKey`, `DefaultEndpointsProtocol`,
    /// `EndpointSuffix`, `BlobEndpoint`, `UseDevelopmentStorage`. Values are
    /// split at the first `=`, so base64 padding in keys survives.
    ///
    /// # Errors
    ///
    /// [`StorageError::Misconfigured`] when the account name or key is
    /// missing, the key is not base64, or the endpoint is not a URL.
    pub fn from_connection_string(raw: &str) -> Result<Self, StorageError> {
        let parts: BTreeMap<&str, &str> = raw
            .split(';')
            .filter_map(|segment| segment.trim().split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();

        if parts
            .get("UseDevelopmentStorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Self::build(DEV_ACCOUNT, DEV_KEY, DEV_BLOB_ENDPOINT);
        }

        let account = parts
            .get("AccountName")
            .ok_or_else(|| StorageError::Misconfigured("connection string has no AccountName".into()))?;
        let key = parts
            .get("AccountKey")
            .ok_or_else(|| StorageError::Misconfigured("connection string has no AccountKey".into()))?;

        let endpoint = match parts.get("BlobEndpoint") {
            Some(endpoint) => (*endpoint).to_string(),
            None => {
                let protocol = parts.get("DefaultEndpointsProtocol").unwrap_or(&"https");
                let suffix = parts.get("EndpointSuffix").unwrap_or(&"core.windows.net");
                format!("{protocol}://{account}.blob.{suffix}")
            }
        };
        Self::build(account, key, &endpoint)
    }

    fn build(account: &str, key: &str, endpoint: &str) -> Result<Self, StorageError> {
        let credential = SharedKeyCredential::new(account, key)?;
        let blob_endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| StorageError::Misconfigured(format!("invalid blob endpoint '{endpoint}': {e}")))?;
        if blob_endpoint.cannot_be_a_base() {
            return Err(StorageError::Misconfigured(format!("invalid blob endpoint '{endpoint}'")));
        }
        Ok(Self { credential, blob_endpoint })
    }

    /// `{endpoint}/{container}` or `{endpoint}/{container}/{blob}`, each
    /// segment percent-encoded.
    pub(crate) fn resource_url(&self, container: &str, blob: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.blob_endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| StorageError::Misconfigured("blob endpoint cannot hold a path".into()))?;
            segments.pop_if_empty().push(container);
            if let Some(blob) = blob {
                segments.push(blob);
            }
        }
        Ok(url)
    }
}

// =============================================================================
// SHARED KEY SIGNING
// =============================================================================

/// Build the Shared Key string-to-sign for a request.
///
/// `headers` must already contain every `x-ms-*` header that will be sent.
pub(crate) fn shared_key_string_to_sign(method: &Method, url: &Url, headers: &HeaderMap, account: &str) -> String {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    // Zero length is signed as the empty string.
    let content_length = match header(CONTENT_LENGTH).as_str() {
        "0" => String::new(),
        other => other.to_string(),
    };

    let ms_headers: BTreeMap<String, &str> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .filter_map(|(name, value)| Some((name.as_str().to_ascii_lowercase(), value.to_str().ok()?.trim())))
        .collect();

    let mut out = String::new();
    out.push_str(method.as_str());
    out.push('\n');
    // Content-Encoding, Content-Language
    out.push_str("\n\n");
    out.push_str(&content_length);
    out.push('\n');
    // Content-MD5
    out.push('\n');
    out.push_str(&header(CONTENT_TYPE));
    out.push('\n');
    // Date, If-Modified-Since, If-Match, If-None-Match, If-Unmodified-Since, Range
    out.push_str("\n\n\n\n\n\n");
    for (name, value) in &ms_headers {
        out.push_str(name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    out.push('/');
    out.push_str(account);
    out.push_str(url.path());
    let query: BTreeMap<String, String> = url
        .query_pairs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.into_owned()))
        .collect();
    for (name, value) in &query {
        out.push('\n');
        out.push_str(name);
        out.push(':');
        out.push_str(value);
    }
    out
}

/// RFC 1123 timestamp for `x-ms-date`.
pub(crate) fn http_date(at: OffsetDateTime) -> String {
    at.to_offset(time::UtcOffset::UTC)
        .format(format_description!(
            "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
        ))
        .unwrap_or_default()
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct AzureBlobStore {
    http: reqwest::Client,
    account: StorageAccount,
}

impl AzureBlobStore {
    /// # Errors
    ///
    /// [`StorageError::Misconfigured`] if the HTTP client cannot be built.
    pub fn new(account: StorageAccount) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| StorageError::Misconfigured(format!("HTTP client build failed: {e}")))?;
        info!(
            account = %account.credential.account,
            endpoint = %account.blob_endpoint,
            "blob storage client initialized"
        );
        Ok(Self { http, account })
    }

    /// # Errors
    ///
    /// Connection string parse failure or HTTP client build failure.
    pub fn from_connection_string(raw: &str) -> Result<Self, StorageError> {
        Self::new(StorageAccount::from_connection_string(raw)?)
    }

    async fn send(&self, method: Method, url: Url, mut headers: HeaderMap, body: Bytes) -> Result<StatusCode, StorageError> {
        headers.insert(HeaderName::from_static("x-ms-date"), header_value(&http_date(OffsetDateTime::now_utc()))?);
        headers.insert(HeaderName::from_static("x-ms-version"), HeaderValue::from_static(SERVICE_VERSION));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        let credential = &self.account.credential;
        let signature = credential.sign(&shared_key_string_to_sign(&method, &url, &headers, &credential.account));
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&format!("SharedKey {}:{signature}", credential.account))?,
        );

        debug!(%method, path = url.path(), "storage request");
        let response = self
            .http
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(status);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Response { status: status.as_u16(), body })
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, StorageError> {
    HeaderValue::from_str(raw).map_err(|e| StorageError::Request(format!("invalid header value: {e}")))
}

#[async_trait::async_trait]
impl BlobStore for AzureBlobStore {
    async fn create_container_if_absent(&self, container: &str) -> Result<(), StorageError> {
        let mut url = self.account.resource_url(container, None)?;
        url.query_pairs_mut().append_pair("restype", "container");
        let status = self.send(Method::PUT, url, HeaderMap::new(), Bytes::new()).await?;
        if status == StatusCode::CREATED {
            info!(container, "created blob container");
        }
        Ok(())
    }

    async fn put_blob(
        &self,
        container: &str,
        blob: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let url = self.account.resource_url(container, Some(blob))?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-ms-blob-type"), HeaderValue::from_static("BlockBlob"));
        headers.insert(CONTENT_TYPE, header_value(content_type.unwrap_or("application/octet-stream"))?);
        match self.send(Method::PUT, url, headers, data).await? {
            // A 409 on a blob PUT is a lease or state conflict, not "already exists".
            StatusCode::CONFLICT => {
                Err(StorageError::Response { status: StatusCode::CONFLICT.as_u16(), body: String::new() })
            }
            _ => Ok(()),
        }
    }

    fn signed_read_url(&self, container: &str, blob: &str, expiry: OffsetDateTime) -> Result<String, StorageError> {
        let mut url = self.account.resource_url(container, Some(blob))?;
        let sas = BlobSas { container, blob, permissions: "r", expiry };
        url.set_query(Some(&sas.to_query(&self.account.credential)));
        Ok(url.into())
    }
}

#[cfg(test)]
#[path = "azure_test.rs"]
mod tests;

//! Service shared-access signatures for single blobs.
//!
//! A SAS is a stateless capability: the query string names the resource,
//! permissions and expiry, and `sig` is an HMAC-SHA256 over those fields
//! keyed with the account key. The storage service recomputes it on every
//! request, so nothing is persisted here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use super::StorageError;

/// Storage service version used for both SAS and REST requests.
pub const SERVICE_VERSION: &str = "2021-08-06";

/// Account name plus an HMAC keyed with the decoded account key.
#[derive(Clone)]
pub struct SharedKeyCredential {
    pub account: String,
    mac: Hmac<Sha256>,
}

impl std::fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account", &self.account)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl SharedKeyCredential {
    /// # Errors
    ///
    /// [`StorageError::Misconfigured`] if `key_base64` is not valid base64.
    pub fn new(account: impl Into<String>, key_base64: &str) -> Result<Self, StorageError> {
        let key = STANDARD
            .decode(key_base64.trim())
            .map_err(|e| StorageError::Misconfigured(format!("AccountKey is not valid base64: {e}")))?;
        let mac = Hmac::<Sha256>::new_from_slice(&key)
            .map_err(|e| StorageError::Misconfigured(format!("AccountKey rejected: {e}")))?;
        Ok(Self { account: account.into(), mac })
    }

    /// Base64 HMAC-SHA256 of `string_to_sign`.
    #[must_use]
    pub fn sign(&self, string_to_sign: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Read-only grant on one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSas<'a> {
    pub container: &'a str,
    pub blob: &'a str,
    pub permissions: &'a str,
    pub expiry: OffsetDateTime,
}

impl BlobSas<'_> {
    /// Expiry in the `YYYY-MM-DDThh:mm:ssZ` form the service expects.
    #[must_use]
    pub fn expiry_param(&self) -> String {
        format_utc_seconds(self.expiry)
    }

    /// The exact text the signature covers. Unused optional fields (start,
    /// identifier, IP, protocol, snapshot, encryption scope, response
    /// header overrides) are present as empty lines.
    #[must_use]
    pub fn string_to_sign(&self, account: &str) -> String {
        let canonical = format!("/blob/{account}/{}/{}", self.container, self.blob);
        let expiry = self.expiry_param();
        [
            self.permissions,
            "",
            expiry.as_str(),
            canonical.as_str(),
            "",
            "",
            "",
            SERVICE_VERSION,
            "b",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
        ]
        .join("\n")
    }

    /// Signed query string (without the leading `?`).
    #[must_use]
    pub fn to_query(&self, credential: &SharedKeyCredential) -> String {
        let sig = credential.sign(&self.string_to_sign(&credential.account));
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("sv", SERVICE_VERSION)
            .append_pair("se", &self.expiry_param())
            .append_pair("sr", "b")
            .append_pair("sp", self.permissions)
            .append_pair("sig", &sig)
            .finish()
    }
}

fn format_utc_seconds(at: OffsetDateTime) -> String {
    at.to_offset(UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z"))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "sas_test.rs"]
mod tests;

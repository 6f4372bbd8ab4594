//! The persisted value: two hex-encoded envelopes.

use serde::{Deserialize, Serialize};

use super::StoreError;

/// Encrypted credential as stored under its token.
///
/// Wire form is `{"key": "<hex>", "value": "<hex>"}`. The field names are
/// historical: `key` holds the encrypted password and `value` the encrypted
/// email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// `hex(envelope(password))`.
    #[serde(rename = "key")]
    pub encrypted_password: String,
    /// `hex(envelope(email))`.
    #[serde(rename = "value")]
    pub encrypted_email: String,
}

impl EncryptedRecord {
    /// Build a record from raw password and email envelopes.
    pub fn from_envelopes(password_envelope: &[u8], email_envelope: &[u8]) -> Self {
        Self {
            encrypted_password: hex::encode(password_envelope),
            encrypted_email: hex::encode(email_envelope),
        }
    }

    /// Encode as the JSON string written to the store.
    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode the JSON string read from the store.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(raw)?)
    }
}

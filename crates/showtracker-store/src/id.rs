use std::fmt;

use serde::Serialize;

use crate::StoreError;

const ID_LEN: usize = 24;

/// Document identifier: 24 lowercase hexadecimal characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        let mut hex = uuid::Uuid::new_v4().simple().to_string();
        hex.truncate(ID_LEN);
        Self(hex)
    }

    /// Parse an identifier taken from a request path
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cast` unless `value` is exactly 24 hex digits
    pub fn parse(value: &str) -> Result<Self, StoreError> {
        if value.len() == ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(StoreError::Cast {
                path: "_id".to_owned(),
                value: value.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_24_hex_chars() {
        let id = RecordId::new();
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(id, RecordId::new());
    }

    #[test]
    fn parse_accepts_uppercase_and_normalizes() {
        let id = RecordId::parse("64B7F0C2A1D3E4F5A6B7C8D9").unwrap();
        assert_eq!(id.as_str(), "64b7f0c2a1d3e4f5a6b7c8d9");
    }

    #[test]
    fn parse_rejects_malformed_values() {
        for value in ["", "123", "zzzzzzzzzzzzzzzzzzzzzzzz", "64b7f0c2a1d3e4f5a6b7c8d9a"] {
            let err = RecordId::parse(value).unwrap_err();
            assert!(matches!(err, StoreError::Cast { ref path, .. } if path == "_id"));
        }
    }
}

use std::fmt;

use indexmap::IndexMap;

/// Error code a document database reports for a unique index violation
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Errors raised by the document store
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// One or more fields failed schema validation
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A unique index already holds the key
    #[error("E{code} duplicate key error, index: {index}")]
    DuplicateKey { code: i32, index: String },

    /// A value could not be converted to the type of `path`
    #[error("cast to ObjectId failed for value \"{value}\" at path \"{path}\"")]
    Cast { path: String, value: String },
}

impl StoreError {
    pub(crate) fn duplicate(index: &str) -> Self {
        Self::DuplicateKey {
            code: DUPLICATE_KEY_CODE,
            index: index.to_owned(),
        }
    }
}

/// Validation messages keyed by field path, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(IndexMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `path`; the first message per path wins
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(path, message)| (path.as_str(), message.as_str()))
    }

    /// Messages in insertion order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    /// `Ok` when nothing was recorded
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` carrying every recorded failure
    pub fn into_result(self) -> Result<(), StoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(self))
        }
    }
}

impl<P: Into<String>, M: Into<String>> FromIterator<(P, M)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (P, M)>>(iter: I) -> Self {
        let mut errors = Self::new();
        for (path, message) in iter {
            errors.add(path, message);
        }
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}: {message}")?;
        }
        Ok(())
    }
}

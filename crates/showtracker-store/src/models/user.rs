use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{check_max_chars, trim_in_place, trim_optional};
use crate::{Document, FieldErrors, RecordId, StoreError};

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("must be valid regex"))
}

/// Registered account
///
/// The password hash never leaves the store: it is skipped when the user is
/// serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// True when `login` names this account by username or email
    pub fn matches_login(&self, login: &str) -> bool {
        self.username == login || self.email == login.to_lowercase()
    }
}

impl Document for User {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn normalize(&mut self) {
        trim_in_place(&mut self.username);
        trim_in_place(&mut self.email);
        self.email = self.email.to_lowercase();
        trim_optional(&mut self.first_name);
        trim_optional(&mut self.last_name);
    }

    fn validate(&self) -> Result<(), StoreError> {
        let mut errors = FieldErrors::new();
        validate_profile(
            &mut errors,
            &self.username,
            &self.email,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        );
        if self.password_hash.is_empty() {
            errors.add("password", "Password obbligatoria");
        }
        errors.into_result()
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("username_1", self.username.clone()), ("email_1", self.email.clone())]
    }

    fn sort_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Registration input, validated on the plain password before hashing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    /// Apply the same setters the stored user gets
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.username);
        trim_in_place(&mut self.email);
        self.email = self.email.to_lowercase();
        trim_optional(&mut self.first_name);
        trim_optional(&mut self.last_name);
    }

    /// Check every field, including the plain password length
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` listing every failing field
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut errors = FieldErrors::new();
        validate_profile(
            &mut errors,
            &self.username,
            &self.email,
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        );

        if self.password.is_empty() {
            errors.add("password", "Password obbligatoria");
        } else if self.password.chars().count() < 6 {
            errors.add("password", "Password deve essere di almeno 6 caratteri");
        }

        errors.into_result()
    }

    /// Build the stored account once the password has been hashed
    pub fn into_user(self, password_hash: String) -> User {
        let now = Utc::now();
        User {
            id: RecordId::new(),
            username: self.username,
            email: self.email,
            password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

fn validate_profile(
    errors: &mut FieldErrors,
    username: &str,
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) {
    let username_len = username.chars().count();
    if username.is_empty() {
        errors.add("username", "Username obbligatorio");
    } else if username_len < 3 {
        errors.add("username", "Username deve essere di almeno 3 caratteri");
    } else if username_len > 50 {
        errors.add("username", "Username non può superare i 50 caratteri");
    }

    if email.is_empty() {
        errors.add("email", "Email obbligatoria");
    } else if !email_pattern().is_match(email) {
        errors.add("email", "Formato email non valido");
    }

    check_max_chars(errors, "firstName", first_name, 50, "Nome max 50 caratteri");
    check_max_chars(errors, "lastName", last_name, 50, "Cognome max 50 caratteri");
}

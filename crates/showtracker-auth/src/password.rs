use crate::AuthError;

/// bcrypt hashing on the blocking thread pool
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plain password with a fresh salt
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if bcrypt rejects the input
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check a plain password against a stored hash
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Hashing` if the stored hash is unreadable
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("hunter22").await.unwrap();

        assert_ne!(hash, "hunter22");
        assert!(hasher.verify("hunter22", &hash).await.unwrap());
        assert!(!hasher.verify("hunter23", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new(4);
        let first = hasher.hash("password").await.unwrap();
        let second = hasher.hash("password").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        let hasher = PasswordHasher::new(4);
        let err = hasher.verify("password", "not-a-bcrypt-hash").await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }
}

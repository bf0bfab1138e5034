use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

/// Argon2id digest of an account password, kept as a PHC string
/// (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).
///
/// Plaintext passwords are hashed before they reach the store; only the encoded digest is
/// persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn hash(password: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|err| PasswordError::Hash(err.to_string()))?;
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hash(err.to_string()))?;
        Ok(Self(hash.to_string()))
    }

    /// Rehydrate a digest read back from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Result<Self, PasswordError> {
        let encoded = encoded.into();
        let parsed = PasswordHash::new(&encoded).map_err(|_| PasswordError::Malformed)?;
        if !parsed.algorithm.as_str().starts_with("argon2") || parsed.hash.is_none() {
            return Err(PasswordError::Malformed);
        }
        Ok(Self(encoded))
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match PasswordHash::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("malformed password digest")]
    Malformed,
}

//! Argon2id adapter for the domain `PasswordHasher` port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash as PhcString, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::PasswordHash;

/// Password hasher using Argon2id with the library's default parameters.
#[derive(Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError::backend(err.to_string()))?;
        PasswordHash::new(hashed.to_string())
            .map_err(|err| PasswordHashError::backend(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHashError::backend(format!("malformed stored hash: {err}")))?;
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::backend(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("hunter22").expect("hashing succeeds");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("hunter22", &hash).expect("verify succeeds"));
        assert!(!hasher.verify("wrong", &hash).expect("verify succeeds"));
    }

    #[test]
    fn malformed_stored_hash_is_a_backend_error() {
        let hasher = Argon2PasswordHasher::new();
        let hash = PasswordHash::new("not-a-phc-string").expect("non-empty");

        let err = hasher
            .verify("hunter22", &hash)
            .expect_err("malformed hash must fail");
        assert!(matches!(err, PasswordHashError::Backend { .. }));
    }
}

//! One-way password hashing and verification.
//!
//! Argon2id in PHC string format: the stored hash embeds its own salt and
//! parameters, so verification needs nothing but the hash and the candidate
//! password. Comparison inside the verifier is constant-time.

use argon2::{
    password_hash::{
        Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use rand::rngs::OsRng;
use std::fmt;

/// Failure modes that are *not* "wrong password".
#[derive(Debug)]
pub enum PasswordError {
    /// A stored hash failed to parse. Signals a data-integrity fault, never
    /// a user error.
    MalformedHash(HashError),
    /// Hashing itself failed; treated as fatal misconfiguration rather than
    /// silently producing a weak hash.
    Hash(HashError),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHash(err) => write!(f, "malformed stored password hash: {err}"),
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
/// Returns [`PasswordError::Hash`] on hasher misconfiguration.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Verify a candidate password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`, never an error; errors are reserved for
/// corrupt stored hashes.
///
/// # Errors
/// Returns [`PasswordError::MalformedHash`] when the stored hash is not a
/// valid PHC string.
pub fn verify_password(stored: &str, password: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(PasswordError::Hash(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = hash_password("password1234").unwrap();
        assert!(verify_password(&hash, "password1234").unwrap());
    }

    #[test]
    fn wrong_password_is_false_not_an_error() {
        let hash = hash_password("password1234").unwrap();
        assert!(!verify_password(&hash, "password5678").unwrap());
    }

    #[test]
    fn hash_is_phc_format_with_embedded_salt() {
        let hash = hash_password("password1234").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("password1234").unwrap();
        let second = hash_password("password1234").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_is_a_distinct_error() {
        let result = verify_password("not-a-phc-string", "password1234");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}

//! Stateless access token signing and verification.
//!
//! Tokens are HS256 JWTs carrying `{sub, email, iat, exp}` with
//! `exp = iat + fixed lifetime`. There is no revocation or renewal; a token
//! stops being valid only when its lifetime elapses.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim set carried by an access token. The wire format is an opaque signed
/// string; nothing outside this module should parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Why verification failed. Both variants surface as the same 401; the split
/// exists for diagnostics only.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &[u8], ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No leeway: expiry is exact so tests and callers agree on the window.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for `subject`.
    ///
    /// # Errors
    /// Fails only on signing misconfiguration; never for user input.
    pub fn issue(&self, subject: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, email, Utc::now().timestamp())
    }

    fn issue_at(
        &self,
        subject: Uuid,
        email: &str,
        iat: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat,
            exp: iat + self.ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check signature integrity and expiry.
    ///
    /// # Errors
    /// `Expired` for a structurally valid but time-lapsed token, `Invalid`
    /// for everything else (tampered, garbage, wrong key).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret", 1800)
    }

    #[test]
    fn issue_then_verify_returns_claims() {
        let subject = Uuid::new_v4();
        let token = signer().issue(subject, "a@test.com").unwrap();

        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.sub, subject.to_string());
        assert_eq!(claims.email, "a@test.com");
        assert_eq!(claims.exp, claims.iat + 1800);
    }

    #[test]
    fn elapsed_lifetime_yields_expired() {
        let signer = signer();
        let past = Utc::now().timestamp() - 1801;
        let token = signer
            .issue_at(Uuid::new_v4(), "a@test.com", past)
            .unwrap();

        assert_eq!(signer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_valid_until_the_window_closes() {
        let signer = signer();
        // One second of lifetime left.
        let iat = Utc::now().timestamp() - 1799;
        let token = signer.issue_at(Uuid::new_v4(), "a@test.com", iat).unwrap();

        assert!(signer.verify(&token).is_ok());
    }

    #[test]
    fn tampered_token_yields_invalid() {
        let signer = signer();
        let token = signer.issue(Uuid::new_v4(), "a@test.com").unwrap();

        // Flip a character in each segment: header, payload, signature.
        for index in [1, token.find('.').unwrap() + 2, token.len() - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            if tampered == token {
                continue;
            }
            assert_eq!(signer.verify(&tampered), Err(TokenError::Invalid));
        }
    }

    #[test]
    fn wrong_secret_yields_invalid() {
        let token = signer().issue(Uuid::new_v4(), "a@test.com").unwrap();
        let other = TokenSigner::new(b"another-secret", 1800);

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_yields_invalid() {
        assert_eq!(signer().verify("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(signer().verify(""), Err(TokenError::Invalid));
    }
}

use secrecy::SecretString;

/// Process-wide immutable values loaded once at startup.
///
/// The signing secret and token lifetime never change for the life of the
/// process; there is no reload path.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret: SecretString, token_ttl_seconds: i64) -> Self {
        Self {
            token_secret: secret,
            token_ttl_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("sikreta".to_string()), 1800);
        assert_eq!(args.token_secret.expose_secret(), "sikreta");
        assert_eq!(args.token_ttl_seconds, 1800);
    }
}

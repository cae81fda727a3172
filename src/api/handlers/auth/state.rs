//! Auth configuration and shared state.

use super::token::TokenSigner;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 60;

/// Token signing configuration, constructed once at startup and immutable
/// thereafter.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_secret: String,
    token_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(token_secret: String) -> Self {
        Self {
            token_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    pub(super) fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

/// Process-wide auth state shared by reference across all requests.
pub struct AuthState {
    config: AuthConfig,
    tokens: TokenSigner,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let tokens = TokenSigner::new(
            config.token_secret().as_bytes(),
            config.token_ttl_seconds(),
        );

        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, AuthState};

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new("sikreta".to_string());

        assert_eq!(config.token_secret(), "sikreta");
        assert_eq!(
            config.token_ttl_seconds(),
            super::DEFAULT_TOKEN_TTL_SECONDS
        );

        let config = config.with_token_ttl_seconds(120);
        assert_eq!(config.token_ttl_seconds(), 120);
    }

    #[test]
    fn auth_state_builds_a_signer_from_config() {
        let state = AuthState::new(AuthConfig::new("sikreta".to_string()).with_token_ttl_seconds(60));
        assert_eq!(state.tokens().ttl_seconds(), 60);
        assert_eq!(state.config().token_ttl_seconds(), 60);
    }
}

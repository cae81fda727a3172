use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::ExposeSecret;

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            let auth_config = AuthConfig::new(globals.token_secret.expose_secret().to_string())
                .with_token_ttl_seconds(globals.token_ttl_seconds);

            api::new(port, dsn, auth_config).await?;
        }
    }

    Ok(())
}

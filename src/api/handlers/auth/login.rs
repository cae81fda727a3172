//! Authentication endpoint.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    password::{verify_password, PasswordError},
    state::AuthState,
    storage::{lookup_credentials, CredentialRow},
    types::{LoginRequest, TokenResponse},
    utils::{normalize_email, valid_email, valid_password},
};

#[derive(Debug)]
enum LoginRejection {
    /// Unknown email and wrong password share this variant so callers cannot
    /// enumerate accounts.
    InvalidCredentials,
    /// Corrupt stored hash; a data fault, not a credential failure.
    Integrity(PasswordError),
}

impl IntoResponse for LoginRejection {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidCredentials => {
                (StatusCode::FORBIDDEN, "Wrong credentials".to_string()).into_response()
            }
            Self::Integrity(err) => {
                error!("Stored credential fault: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Malformed email or password", body = String),
        (status = 403, description = "Wrong credentials", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }
    if !valid_password(&request.password) {
        return (StatusCode::BAD_REQUEST, "Empty password".to_string()).into_response();
    }

    let record = match lookup_credentials(&pool, &email).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to lookup credentials: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let record = match check_credentials(record, &request.password) {
        Ok(record) => record,
        Err(rejection) => return rejection.into_response(),
    };

    match auth_state.tokens().issue(record.user_id, &record.email) {
        Ok(access_token) => (StatusCode::OK, Json(TokenResponse { access_token })).into_response(),
        Err(err) => {
            error!("Failed to sign token: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Decide a login attempt. Absent user and mismatched password produce the
/// identical rejection.
fn check_credentials(
    record: Option<CredentialRow>,
    password: &str,
) -> Result<CredentialRow, LoginRejection> {
    let Some(record) = record else {
        return Err(LoginRejection::InvalidCredentials);
    };

    match verify_password(&record.password_hash, password) {
        Ok(true) => Ok(record),
        Ok(false) => Err(LoginRejection::InvalidCredentials),
        Err(err) => Err(LoginRejection::Integrity(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::password::hash_password;
    use uuid::Uuid;

    fn record(password: &str) -> CredentialRow {
        CredentialRow {
            user_id: Uuid::new_v4(),
            email: "a@test.com".to_string(),
            password_hash: hash_password(password).unwrap(),
        }
    }

    #[test]
    fn correct_password_passes() {
        let result = check_credentials(Some(record("password1234")), "password1234");
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_email_and_wrong_password_are_indistinguishable() {
        let absent = check_credentials(None, "password1234");
        let mismatch = check_credentials(Some(record("password1234")), "password5678");

        assert!(matches!(absent, Err(LoginRejection::InvalidCredentials)));
        assert!(matches!(mismatch, Err(LoginRejection::InvalidCredentials)));
    }

    #[test]
    fn corrupt_hash_is_an_integrity_fault_not_a_credential_failure() {
        let broken = CredentialRow {
            user_id: Uuid::new_v4(),
            email: "a@test.com".to_string(),
            password_hash: "not-a-phc-string".to_string(),
        };

        let result = check_credentials(Some(broken), "password1234");
        assert!(matches!(result, Err(LoginRejection::Integrity(_))));
    }
}

//! Registration endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use tracing::error;

use super::{
    password::hash_password,
    storage::{insert_user, SignupOutcome},
    types::{SignupRequest, UserResponse},
    utils::{normalize_email, valid_email, valid_password},
};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Malformed email or password", body = String),
        (status = 409, description = "Email already exists", body = String)
    ),
    tag = "auth"
)]
pub async fn signup(
    pool: Extension<PgPool>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
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

    // Hash before touching the store; a failure here is misconfiguration,
    // never user error.
    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    // No existence pre-check: check-then-act would race under concurrent
    // signups, so the unique constraint decides.
    match insert_user(&pool, &email, &password_hash).await {
        Ok(SignupOutcome::Created(user)) => {
            (StatusCode::CREATED, Json(UserResponse::from(user))).into_response()
        }
        Ok(SignupOutcome::Conflict) => {
            (StatusCode::CONFLICT, "Email already exists".to_string()).into_response()
        }
        Err(err) => {
            error!("Failed to create user: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

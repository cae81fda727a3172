//! Authenticated self-service endpoints.
//!
//! Flow Overview:
//! 1) The route layer authenticates the bearer token and injects a principal.
//! 2) Resolve the current user from the database.
//! 3) Apply allow-listed profile updates.
//!
//! The password hash is never selected by these queries and the update path
//! cannot touch it: `password_hash` is write-once at signup.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sqlx::PgPool;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use serde::Deserialize;

use super::auth::principal::Principal;
use super::auth::storage::UserRow;
use super::auth::types::UserResponse;
use super::auth::utils::{is_unique_violation, normalize_email, valid_email};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug)]
enum ServiceError {
    BadRequest(&'static str),
    Conflict(&'static str),
    Database(sqlx::Error),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            Self::Database(err) => {
                error!("Failed to handle user request: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The authenticated user's profile", body = UserResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 404, description = "User no longer exists"),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn get_me(
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match fetch_user(&pool, principal.user_id).await {
        // The token may outlive its user; an absent row is a plain 404.
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => {
            error!("Failed to fetch profile: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/users",
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid update payload", body = String),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 409, description = "Email already exists", body = String),
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn patch_users(
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
    payload: Option<Json<UserUpdateRequest>>,
) -> impl IntoResponse {
    let request: UserUpdateRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let updates = match validate_updates(request) {
        Ok(updates) => updates,
        Err(err) => return err.into_response(),
    };

    match apply_updates(&pool, principal.user_id, updates).await {
        Ok(Some(user)) => (StatusCode::OK, Json(UserResponse::from(user))).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug)]
struct ProfileUpdates {
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

fn validate_updates(request: UserUpdateRequest) -> Result<ProfileUpdates, ServiceError> {
    let email = match request.email {
        Some(email) => {
            let email = normalize_email(&email);
            if !valid_email(&email) {
                return Err(ServiceError::BadRequest("Invalid email"));
            }
            Some(email)
        }
        None => None,
    };

    let first_name = normalize_optional(request.first_name);
    let last_name = normalize_optional(request.last_name);

    if email.is_none() && first_name.is_none() && last_name.is_none() {
        return Err(ServiceError::BadRequest("No updates provided"));
    }

    Ok(ProfileUpdates {
        email,
        first_name,
        last_name,
    })
}

async fn apply_updates(
    pool: &PgPool,
    user_id: Uuid,
    updates: ProfileUpdates,
) -> Result<Option<UserRow>, ServiceError> {
    match update_profile(pool, user_id, updates).await {
        Ok(row) => Ok(row),
        Err(err) if is_unique_violation(&err) => Err(ServiceError::Conflict("Email already exists")),
        Err(err) => Err(ServiceError::Database(err)),
    }
}

async fn fetch_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    let query = r#"
        SELECT
            id::text AS id,
            email,
            first_name,
            last_name,
            to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
            to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
        FROM users
        WHERE id = $1
        LIMIT 1
    "#;
    let row = sqlx::query(query).bind(user_id).fetch_optional(pool).await?;
    Ok(row.map(user_row))
}

async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    updates: ProfileUpdates,
) -> Result<Option<UserRow>, sqlx::Error> {
    let query = r#"
        UPDATE users
        SET
            email = COALESCE($1, email),
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            updated_at = NOW()
        WHERE id = $4
        RETURNING
            id::text AS id,
            email,
            first_name,
            last_name,
            to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
            to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
    "#;
    let row = sqlx::query(query)
        .bind(updates.email)
        .bind(updates.first_name)
        .bind(updates.last_name)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(user_row))
}

fn user_row(row: sqlx::postgres::PgRow) -> UserRow {
    use sqlx::Row;
    UserRow {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_rejected() {
        let request = UserUpdateRequest {
            email: None,
            first_name: None,
            last_name: None,
        };
        assert!(matches!(
            validate_updates(request),
            Err(ServiceError::BadRequest("No updates provided"))
        ));
    }

    #[test]
    fn invalid_email_update_is_rejected() {
        let request = UserUpdateRequest {
            email: Some("not-an-email".to_string()),
            first_name: Some("Testa".to_string()),
            last_name: None,
        };
        assert!(matches!(
            validate_updates(request),
            Err(ServiceError::BadRequest("Invalid email"))
        ));
    }

    #[test]
    fn blank_names_collapse_to_none() {
        let request = UserUpdateRequest {
            email: Some("updated@test.com".to_string()),
            first_name: Some("   ".to_string()),
            last_name: Some(" Testman ".to_string()),
        };
        let updates = validate_updates(request).unwrap();
        assert_eq!(updates.email.as_deref(), Some("updated@test.com"));
        assert_eq!(updates.first_name, None);
        assert_eq!(updates.last_name.as_deref(), Some("Testman"));
    }

    #[test]
    fn update_request_rejects_unknown_fields() {
        // `password_hash` must not be editable through this endpoint.
        let result: Result<UserUpdateRequest, _> =
            serde_json::from_str(r#"{"email":"a@test.com","password_hash":"x"}"#);
        assert!(result.is_err());
    }
}

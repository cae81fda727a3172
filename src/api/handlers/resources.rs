//! Bookmark endpoints scoped to the authenticated owner.
//!
//! Ownership is the sole authorization predicate. Every read-by-id, update,
//! and delete first resolves the row, then compares its `owner_id` to the
//! principal; "doesn't exist" and "exists but isn't yours" are deliberately
//! the same 404 so responses never reveal that another user's bookmark
//! exists. The check runs before any mutation is applied.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sqlx::{PgPool, Row};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use serde::Serialize;

use super::auth::principal::Principal;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateResourceRequest {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateResourceRequest {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub link: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
enum ResourceError {
    /// Absent and not-owned collapse into this variant by design.
    NotFound,
    Database(sqlx::Error),
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Database(err) => {
                error!("Failed to handle bookmark request: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[derive(Debug)]
struct ResourceRow {
    id: String,
    owner_id: Uuid,
    title: String,
    link: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<ResourceRow> for ResourceResponse {
    fn from(row: ResourceRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id.to_string(),
            title: row.title,
            link: row.link,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// The ownership gate: admit the row only when it exists *and* belongs to
/// `owner_id`; everything else is the same `NotFound`.
fn authorize_owner(
    row: Option<ResourceRow>,
    owner_id: Uuid,
) -> Result<ResourceRow, ResourceError> {
    match row {
        Some(row) if row.owner_id == owner_id => Ok(row),
        _ => Err(ResourceError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Bookmark created, owned by the caller", body = ResourceResponse),
        (status = 400, description = "Malformed payload", body = String),
        (status = 401, description = "Missing, invalid, or expired token"),
    ),
    tag = "resources",
    security(("bearer" = []))
)]
pub async fn create_resource(
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
    payload: Option<Json<CreateResourceRequest>>,
) -> impl IntoResponse {
    let request: CreateResourceRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let title = request.title.trim().to_string();
    let link = request.link.trim().to_string();
    if title.is_empty() || link.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing title or link".to_string()).into_response();
    }

    match insert_resource(&pool, principal.user_id, &title, &link, request.description).await {
        Ok(row) => (StatusCode::CREATED, Json(ResourceResponse::from(row))).into_response(),
        Err(err) => {
            error!("Failed to create bookmark: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/resources",
    responses(
        (status = 200, description = "Bookmarks owned by the caller, newest first", body = [ResourceResponse]),
        (status = 401, description = "Missing, invalid, or expired token"),
    ),
    tag = "resources",
    security(("bearer" = []))
)]
pub async fn list_resources(
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    match fetch_owned(&pool, principal.user_id).await {
        Ok(rows) => {
            let list: Vec<ResourceResponse> =
                rows.into_iter().map(ResourceResponse::from).collect();
            (StatusCode::OK, Json(list)).into_response()
        }
        Err(err) => {
            error!("Failed to list bookmarks: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/resources/{id}",
    params(("id" = String, Path, description = "Bookmark id")),
    responses(
        (status = 200, description = "The bookmark, when owned by the caller", body = ResourceResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 404, description = "Absent or owned by someone else"),
    ),
    tag = "resources",
    security(("bearer" = []))
)]
pub async fn get_resource(
    Path(id): Path<String>,
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let Ok(resource_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let row = match fetch_resource(&pool, resource_id).await {
        Ok(row) => row,
        Err(err) => return ResourceError::Database(err).into_response(),
    };

    match authorize_owner(row, principal.user_id) {
        Ok(row) => (StatusCode::OK, Json(ResourceResponse::from(row))).into_response(),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    patch,
    path = "/resources/{id}",
    params(("id" = String, Path, description = "Bookmark id")),
    request_body = UpdateResourceRequest,
    responses(
        (status = 200, description = "Updated bookmark", body = ResourceResponse),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 404, description = "Absent or owned by someone else"),
    ),
    tag = "resources",
    security(("bearer" = []))
)]
pub async fn update_resource(
    Path(id): Path<String>,
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
    payload: Option<Json<UpdateResourceRequest>>,
) -> impl IntoResponse {
    let Ok(resource_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let request: UpdateResourceRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // Ownership gate before any mutation is applied.
    let row = match fetch_resource(&pool, resource_id).await {
        Ok(row) => row,
        Err(err) => return ResourceError::Database(err).into_response(),
    };
    if let Err(err) = authorize_owner(row, principal.user_id) {
        return err.into_response();
    }

    match apply_update(&pool, resource_id, request).await {
        Ok(Some(row)) => (StatusCode::OK, Json(ResourceResponse::from(row))).into_response(),
        Ok(None) => ResourceError::NotFound.into_response(),
        Err(err) => ResourceError::Database(err).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/resources/{id}",
    params(("id" = String, Path, description = "Bookmark id")),
    responses(
        (status = 204, description = "Bookmark deleted"),
        (status = 401, description = "Missing, invalid, or expired token"),
        (status = 404, description = "Absent or owned by someone else"),
    ),
    tag = "resources",
    security(("bearer" = []))
)]
pub async fn delete_resource(
    Path(id): Path<String>,
    Extension(principal): Extension<Principal>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    let Ok(resource_id) = Uuid::parse_str(id.trim()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    // Ownership gate before the delete is applied.
    let row = match fetch_resource(&pool, resource_id).await {
        Ok(row) => row,
        Err(err) => return ResourceError::Database(err).into_response(),
    };
    if let Err(err) = authorize_owner(row, principal.user_id) {
        return err.into_response();
    }

    match delete_row(&pool, resource_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => ResourceError::Database(err).into_response(),
    }
}

const RESOURCE_COLUMNS: &str = r#"
    id::text AS id,
    owner_id,
    title,
    link,
    description,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
"#;

async fn insert_resource(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    link: &str,
    description: Option<String>,
) -> Result<ResourceRow, sqlx::Error> {
    let query = format!(
        "INSERT INTO resources (owner_id, title, link, description)
         VALUES ($1, $2, $3, $4)
         RETURNING {RESOURCE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(owner_id)
        .bind(title)
        .bind(link)
        .bind(description)
        .fetch_one(pool)
        .await?;
    Ok(resource_row(&row))
}

async fn fetch_resource(pool: &PgPool, id: Uuid) -> Result<Option<ResourceRow>, sqlx::Error> {
    let query = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1 LIMIT 1");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;
    Ok(row.as_ref().map(resource_row))
}

async fn fetch_owned(pool: &PgPool, owner_id: Uuid) -> Result<Vec<ResourceRow>, sqlx::Error> {
    let query = format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources
         WHERE owner_id = $1
         ORDER BY created_at DESC"
    );
    let rows = sqlx::query(&query).bind(owner_id).fetch_all(pool).await?;
    Ok(rows.iter().map(resource_row).collect())
}

async fn apply_update(
    pool: &PgPool,
    id: Uuid,
    request: UpdateResourceRequest,
) -> Result<Option<ResourceRow>, sqlx::Error> {
    let query = format!(
        "UPDATE resources
         SET
             title = COALESCE($1, title),
             link = COALESCE($2, link),
             description = COALESCE($3, description),
             updated_at = NOW()
         WHERE id = $4
         RETURNING {RESOURCE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(request.title)
        .bind(request.link)
        .bind(request.description)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(resource_row))
}

async fn delete_row(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

fn resource_row(row: &sqlx::postgres::PgRow) -> ResourceRow {
    ResourceRow {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        link: row.get("link"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(owner_id: Uuid) -> ResourceRow {
        ResourceRow {
            id: Uuid::new_v4().to_string(),
            owner_id,
            title: "Rust book".to_string(),
            link: "https://doc.rust-lang.org/book/".to_string(),
            description: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn owner_match_admits_the_row() {
        let owner = Uuid::new_v4();
        assert!(authorize_owner(Some(row(owner)), owner).is_ok());
    }

    #[test]
    fn absent_and_not_owned_are_the_same_answer() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let absent = authorize_owner(None, alice);
        let not_owned = authorize_owner(Some(row(bob)), alice);

        assert!(matches!(absent, Err(ResourceError::NotFound)));
        assert!(matches!(not_owned, Err(ResourceError::NotFound)));
    }

    #[test]
    fn not_owned_never_leaks_the_row() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        // The error carries no data from Bob's bookmark.
        let result = authorize_owner(Some(row(bob)), alice);
        assert!(result.is_err());
    }

    #[test]
    fn create_request_rejects_unknown_fields() {
        let result: Result<CreateResourceRequest, _> = serde_json::from_str(
            r#"{"title":"t","link":"https://example.com","owner_id":"intruder"}"#,
        );
        assert!(result.is_err());
    }
}

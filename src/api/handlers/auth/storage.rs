//! Database helpers for signup and login.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new user. Duplicate emails are a
/// normal outcome here, not an error: the unique constraint is the
/// authoritative arbiter under concurrent signups.
#[derive(Debug)]
pub(super) enum SignupOutcome {
    Created(UserRow),
    Conflict,
}

/// User fields safe to expose. The password hash is never selected into
/// this struct.
#[derive(Debug)]
pub(crate) struct UserRow {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

/// Minimal fields needed to check a login attempt.
pub(super) struct CredentialRow {
    pub(super) user_id: Uuid,
    pub(super) email: String,
    pub(super) password_hash: String,
}

pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
) -> Result<SignupOutcome> {
    let query = r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING
            id::text AS id,
            email,
            first_name,
            last_name,
            to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
            to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
    "#;
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(UserRow {
            id: row.get("id"),
            email: row.get("email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Look up login data by email. `None` is indistinguishable from a wrong
/// password at the flow level; callers must not branch differently.
pub(super) async fn lookup_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRow>> {
    let query = "SELECT id, email, password_hash FROM users WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credentials")?;

    Ok(row.map(|row| CredentialRow {
        user_id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }))
}

#[cfg(test)]
mod tests {
    use super::{CredentialRow, SignupOutcome, UserRow};
    use uuid::Uuid;

    #[test]
    fn signup_outcome_debug_names() {
        assert_eq!(format!("{:?}", SignupOutcome::Conflict), "Conflict");
    }

    #[test]
    fn credential_row_holds_values() {
        let row = CredentialRow {
            user_id: Uuid::nil(),
            email: "a@test.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
        };
        assert_eq!(row.user_id, Uuid::nil());
        assert_eq!(row.email, "a@test.com");
    }

    #[test]
    fn user_row_has_no_hash_field() {
        // Compile-time shape check: constructing the row exhaustively proves
        // the selected columns exclude the password hash.
        let UserRow {
            id: _,
            email: _,
            first_name: _,
            last_name: _,
            created_at: _,
            updated_at: _,
        } = UserRow {
            id: String::new(),
            email: String::new(),
            first_name: None,
            last_name: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
    }
}

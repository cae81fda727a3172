//! Small helpers for auth input validation.

use regex::Regex;

/// Trim surrounding whitespace before lookup/uniqueness checks.
/// Case is preserved: emails are compared byte-wise, exactly as stored.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_string()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Passwords only need to be non-empty; strength policy is the client's call.
pub(super) fn valid_password(password: &str) -> bool {
    !password.is_empty()
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

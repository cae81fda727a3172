//! # Legosigno
//!
//! `legosigno` is a multi-tenant bookmark API. It verifies user credentials,
//! issues time-bounded bearer tokens, authenticates every protected request,
//! and enforces that a user may only read or mutate bookmarks they own.
//!
//! ## Architecture
//!
//! - **Credentials** are hashed with Argon2id; the PHC string embeds its own
//!   salt and parameters so verification is self-contained.
//! - **Tokens** are stateless HS256 JWTs carrying `{sub, email, iat, exp}`.
//!   There is no revocation list; validity is purely cryptographic plus time.
//! - **Ownership** is the sole authorization predicate: resource reads and
//!   mutations return `404` both when the row is absent and when it belongs
//!   to someone else, so responses never reveal other users' data exists.
//!
//! The signing secret and token lifetime are loaded once at startup and are
//! immutable for the life of the process. Request handling is stateless and
//! safe to run concurrently; the only atomicity requirement (unique emails
//! under concurrent signup) is delegated to the database's unique constraint.

pub mod api;
pub mod cli;

//! Credentials, tokens, and the signup/login flows.
//!
//! This module is the identity core of the service:
//!
//! - [`password`] hashes and verifies credentials (Argon2id).
//! - [`token`] signs and verifies stateless bearer tokens (HS256).
//! - [`principal`] is the middleware checkpoint that turns an
//!   `Authorization` header into a [`principal::Principal`] for handlers.
//! - [`signup`] and [`login`] orchestrate the two entry transactions.
//!
//! The signing secret and token lifetime live in [`AuthConfig`], built once
//! at startup. Everything here is a pure function of its inputs plus that
//! immutable configuration, so requests can be served concurrently without
//! locking. Duplicate-email detection under concurrent signups is delegated
//! to the database's unique constraint, never a pre-check.

pub mod login;
pub mod password;
pub mod principal;
pub mod signup;
mod state;
pub(crate) mod storage;
pub mod token;
pub mod types;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState};

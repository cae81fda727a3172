//! API route handlers.
//!
//! [`auth`] owns the identity core, [`users`] the authenticated profile
//! endpoints, and [`resources`] the owner-scoped bookmark CRUD.

pub mod auth;
pub mod health;
pub mod resources;
pub mod root;
pub mod users;

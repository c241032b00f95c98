/// API route handlers
///
/// One module per resource. Each resource module exposes a `router()`
/// returning its sub-router; handlers follow a fixed order: extract
/// identity, validate input, apply the authorization policy, then touch
/// storage.

pub mod auth;
pub mod clients;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod users;

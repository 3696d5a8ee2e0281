/// API route handlers
///
/// Organized by resource:
///
/// - `health`: liveness probe
/// - `auth_user`: anonymous session endpoints (join, login, refresh)
/// - `auth_member`: member credential endpoints
/// - `todos`: member-scoped todo CRUD and search
/// - `tasks`: anonymous task CRUD

pub mod auth_member;
pub mod auth_user;
pub mod health;
pub mod tasks;
pub mod todos;

/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, refresh and profile
/// - `workspaces`, `members`, `projects`, `columns`, `tasks`: the board hierarchy
///
/// `access` holds the shared workspace gate and `views` the JSON projections.

pub(crate) mod access;
pub mod auth;
pub mod columns;
pub mod health;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod views;
pub mod workspaces;

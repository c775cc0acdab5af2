/// Database models for TeamBoard
///
/// Each model owns the SQL for its table. Functions are generic over
/// [`sqlx::PgExecutor`] so they run against a pool or inside a transaction.
///
/// # Models
///
/// - `user`: accounts and login identities
/// - `workspace`: top-level tenant containers
/// - `membership`: user-workspace links with a role
/// - `project`: units of work inside a workspace
/// - `board_column`: the fixed four-column board of a project
/// - `task`: cards on a board
///
/// The [`crate::store`] module wraps these behind the `Store` trait.

pub mod board_column;
pub mod membership;
pub mod project;
pub mod task;
pub mod user;
pub mod workspace;

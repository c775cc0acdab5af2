/// Lifecycle services
///
/// Each service holds an `Arc<dyn Store>` and enforces the business rules for
/// one entity. They are constructed once at startup by [`Services::new`] and
/// shared through the HTTP state; there is no runtime container and no
/// service depends on another.

pub mod columns;
pub mod error;
pub mod members;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod workspaces;

use std::sync::Arc;

use crate::auth::jwt::JwtSettings;
use crate::store::Store;

pub use error::{ServiceError, ServiceResult};

/// All lifecycle services wired against one store
pub struct Services {
    pub users: users::UserService,
    pub workspaces: workspaces::WorkspaceService,
    pub members: members::MemberService,
    pub projects: projects::ProjectService,
    pub columns: columns::ColumnService,
    pub tasks: tasks::TaskService,
}

impl Services {
    pub fn new(store: Arc<dyn Store>, jwt: JwtSettings) -> Self {
        Self {
            users: users::UserService::new(store.clone(), jwt),
            workspaces: workspaces::WorkspaceService::new(store.clone()),
            members: members::MemberService::new(store.clone()),
            projects: projects::ProjectService::new(store.clone()),
            columns: columns::ColumnService::new(store.clone()),
            tasks: tasks::TaskService::new(store),
        }
    }
}

/// Lifecycle rule tests
///
/// Run every service against the in-memory store, so no database is needed.

use std::sync::Arc;

use teamboard_shared::auth::jwt::{validate_access_token, JwtSettings};
use teamboard_shared::models::board_column::{BoardColumn, ColumnName};
use teamboard_shared::models::membership::MemberRole;
use teamboard_shared::models::project::Project;
use teamboard_shared::models::task::Priority;
use teamboard_shared::models::user::{NewUser, User};
use teamboard_shared::models::workspace::Workspace;
use teamboard_shared::services::tasks::TaskDraft;
use teamboard_shared::services::users::{ProfileUpdate, Registration};
use teamboard_shared::services::{ServiceError, Services};
use teamboard_shared::store::{memory::MemoryStore, Store};

const SECRET: &str = "service-rules-secret-at-least-32-bytes";

struct Fixture {
    store: Arc<dyn Store>,
    services: Services,
}

impl Fixture {
    fn new() -> Self {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let services = Services::new(store.clone(), JwtSettings::new(SECRET));
        Self { store, services }
    }

    /// Inserts a user without hashing a password
    async fn user(&self, name: &str) -> User {
        self.store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                password_hash: "unused".to_string(),
                avatar_initials: None,
            })
            .await
            .unwrap()
    }

    async fn workspace(&self, owner: &User, name: &str) -> Workspace {
        self.services
            .workspaces
            .create(name, Some("A workspace".to_string()), owner.id)
            .await
            .unwrap()
    }

    async fn project(&self, workspace: &Workspace, creator: &User) -> (Project, Vec<BoardColumn>) {
        self.services
            .projects
            .create("Launch", None, workspace.id, creator.id)
            .await
            .unwrap()
    }
}

fn column(columns: &[BoardColumn], name: ColumnName) -> &BoardColumn {
    columns.iter().find(|c| c.name == name).unwrap()
}

// Users

#[tokio::test]
async fn test_register_login_refresh_and_change_password() {
    let fx = Fixture::new();
    let users = &fx.services.users;

    let user = users
        .register(Registration {
            name: "Grace Brewster Hopper".to_string(),
            email: "grace@example.com".to_string(),
            password: "cobol-forever".to_string(),
            avatar_initials: None,
        })
        .await
        .unwrap();
    assert_eq!(user.avatar_initials.as_deref(), Some("GB"));
    assert_ne!(user.password_hash, "cobol-forever");

    let tokens = users.authenticate("grace@example.com", "cobol-forever").await.unwrap();
    assert_eq!(tokens.username, "grace@example.com");
    assert_eq!(tokens.expires_in, 86_400);
    assert_eq!(
        validate_access_token(&tokens.access_token, SECRET).unwrap().sub,
        "grace@example.com"
    );

    let refreshed = users.refresh(&tokens.refresh_token).await.unwrap();
    assert_eq!(refreshed.refresh_token, tokens.refresh_token);
    assert!(validate_access_token(&refreshed.access_token, SECRET).is_ok());

    // An access token is not accepted as a refresh token
    assert!(matches!(
        users.refresh(&tokens.access_token).await,
        Err(ServiceError::Authentication(_))
    ));

    assert!(matches!(
        users.change_password(user.id, "wrong", "new-password").await,
        Err(ServiceError::Authentication(_))
    ));
    users
        .change_password(user.id, "cobol-forever", "new-password")
        .await
        .unwrap();

    assert!(matches!(
        users.authenticate("grace@example.com", "cobol-forever").await,
        Err(ServiceError::Authentication(_))
    ));
    assert!(users.authenticate("grace@example.com", "new-password").await.is_ok());
}

#[tokio::test]
async fn test_register_rejects_blank_fields_and_duplicate_email() {
    let fx = Fixture::new();
    let existing = fx.user("Ada").await;

    let blank = fx
        .services
        .users
        .register(Registration {
            name: "   ".to_string(),
            email: "x@example.com".to_string(),
            password: "password".to_string(),
            avatar_initials: None,
        })
        .await;
    assert!(matches!(blank, Err(ServiceError::Validation(_))));

    let duplicate = fx
        .services
        .users
        .register(Registration {
            name: "Ada Again".to_string(),
            email: existing.email.clone(),
            password: "password".to_string(),
            avatar_initials: None,
        })
        .await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn test_avatar_initials_are_bounded() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;

    let too_long = fx
        .services
        .users
        .update_profile(
            ada.id,
            ProfileUpdate {
                avatar_initials: Some("ABCDE".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(too_long, Err(ServiceError::Validation(_))));

    let widest = fx
        .services
        .users
        .update_profile(
            ada.id,
            ProfileUpdate {
                avatar_initials: Some(" ABCD ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(widest.avatar_initials.as_deref(), Some("ABCD"));

    let cleared = fx
        .services
        .users
        .update_profile(
            ada.id,
            ProfileUpdate {
                avatar_initials: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.avatar_initials, None);

    // Rejected before any password is hashed
    let registered = fx
        .services
        .users
        .register(Registration {
            name: "Long Initials".to_string(),
            email: "long@example.com".to_string(),
            password: "password".to_string(),
            avatar_initials: Some("ABCDE".to_string()),
        })
        .await;
    assert!(matches!(registered, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_unknown_email_and_wrong_password_look_the_same() {
    let fx = Fixture::new();

    let err = fx
        .services
        .users
        .authenticate("nobody@example.com", "whatever")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Authentication(msg) if msg == "Invalid email or password"));
}

#[tokio::test]
async fn test_update_profile_keeps_password_and_guards_email() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;

    let updated = fx
        .services
        .users
        .update_profile(
            ada.id,
            ProfileUpdate {
                name: Some("Ada King".to_string()),
                avatar_initials: Some("AK".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada King");
    assert_eq!(updated.email, ada.email);
    assert_eq!(updated.password_hash, ada.password_hash);

    let taken = fx
        .services
        .users
        .update_profile(
            ada.id,
            ProfileUpdate {
                email: Some(bob.email.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(taken, Err(ServiceError::Conflict(_))));
}

// Workspaces and members

#[tokio::test]
async fn test_workspace_names_are_unique_per_owner() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;

    fx.workspace(&ada, "Engineering").await;

    let duplicate = fx.services.workspaces.create("Engineering", None, ada.id).await;
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    assert!(fx.services.workspaces.create("Design", None, ada.id).await.is_ok());
    assert!(fx.services.workspaces.create("Engineering", None, bob.id).await.is_ok());

    let blank = fx.services.workspaces.create("  ", None, ada.id).await;
    assert!(matches!(blank, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn test_owner_becomes_admin_member() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;

    let member = fx
        .services
        .members
        .get_member(ada.id, workspace.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.role, MemberRole::Admin);
}

#[tokio::test]
async fn test_access_predicate_is_owner_or_member() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;
    let eve = fx.user("Eve").await;
    let workspace = fx.workspace(&ada, "Engineering").await;

    // The owner stays authorized without a membership row
    fx.store.delete_member(ada.id, workspace.id).await.unwrap();
    assert!(fx.services.members.is_authorized(ada.id, &workspace).await.unwrap());

    fx.services
        .members
        .add_member(bob.id, workspace.id, MemberRole::Viewer)
        .await
        .unwrap();
    assert!(fx.services.members.is_authorized(bob.id, &workspace).await.unwrap());

    assert!(!fx.services.members.is_authorized(eve.id, &workspace).await.unwrap());
}

#[tokio::test]
async fn test_membership_rules() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let members = &fx.services.members;

    let bob_member = members
        .add_member(bob.id, workspace.id, MemberRole::default())
        .await
        .unwrap();
    assert_eq!(bob_member.role, MemberRole::Member);

    assert!(matches!(
        members.add_member(bob.id, workspace.id, MemberRole::Admin).await,
        Err(ServiceError::Conflict(_))
    ));
    assert!(matches!(
        members.add_member(9_999, workspace.id, MemberRole::Member).await,
        Err(ServiceError::NotFound(_))
    ));

    let promoted = members
        .update_role(bob.id, workspace.id, MemberRole::Admin)
        .await
        .unwrap();
    assert_eq!(promoted.role, MemberRole::Admin);

    // The owner has an ADMIN row, yet can never be removed
    assert!(matches!(
        members.remove_member(ada.id, workspace.id).await,
        Err(ServiceError::CannotRemoveOwner)
    ));

    members.remove_member(bob.id, workspace.id).await.unwrap();
    assert!(matches!(
        members.remove_member(bob.id, workspace.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        members.update_role(bob.id, workspace.id, MemberRole::Viewer).await,
        Err(ServiceError::NotFound(_))
    ));

    let listed = members.list_members(workspace.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].user_id, ada.id);

    assert_eq!(members.list_memberships_of_user(ada.id).await.unwrap().len(), 1);
    assert!(matches!(
        members.list_memberships_of_user(9_999).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_accessible_workspaces_union_owned_and_member_of() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;

    let own = fx.workspace(&bob, "Bob's").await;
    let shared = fx.workspace(&ada, "Shared").await;
    fx.workspace(&ada, "Private").await;
    fx.services
        .members
        .add_member(bob.id, shared.id, MemberRole::Member)
        .await
        .unwrap();

    let mut ids: Vec<i64> = fx
        .services
        .workspaces
        .list_accessible_to(bob.id)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, vec![own.id, shared.id]);

    // Ada owns both of hers and is also their ADMIN member
    let adas = fx.services.workspaces.list_accessible_to(ada.id).await.unwrap();
    assert_eq!(adas.len(), 2);
    assert_eq!(fx.services.members.list_memberships_of_user(ada.id).await.unwrap().len(), 2);

    assert!(matches!(
        fx.services.workspaces.list_accessible_to(9_999).await,
        Err(ServiceError::NotFound(_))
    ));

    assert_eq!(fx.services.workspaces.list().await.unwrap().len(), 3);
    assert_eq!(fx.services.workspaces.list_by_owner(ada.id).await.unwrap().len(), 2);

    let found = fx.services.workspaces.search_by_name("SHAR").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, shared.id);
}

#[tokio::test]
async fn test_only_owner_mutates_workspace_and_delete_cascades() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    fx.services
        .members
        .add_member(bob.id, workspace.id, MemberRole::Admin)
        .await
        .unwrap();
    let (project, _) = fx.project(&workspace, &bob).await;

    assert!(matches!(
        fx.services.workspaces.update(workspace.id, bob.id, "Renamed", None).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        fx.services.workspaces.delete(workspace.id, bob.id).await,
        Err(ServiceError::Forbidden(_))
    ));

    let renamed = fx
        .services
        .workspaces
        .update(workspace.id, ada.id, "Renamed", Some("New description"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Renamed");
    assert_eq!(renamed.description.as_deref(), Some("New description"));

    fx.services.workspaces.delete(workspace.id, ada.id).await.unwrap();

    assert!(matches!(
        fx.services.projects.get(project.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(fx.store.find_member(bob.id, workspace.id).await.unwrap().is_none());
}

// Projects and columns

#[tokio::test]
async fn test_project_creation_bootstraps_four_ordered_columns() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;

    let (project, columns) = fx.project(&workspace, &ada).await;

    let listed = fx.services.columns.list_by_project(project.id).await.unwrap();
    assert_eq!(listed, columns);
    assert_eq!(
        listed.iter().map(|c| (c.name, c.position)).collect::<Vec<_>>(),
        vec![
            (ColumnName::Backlog, 1),
            (ColumnName::ToDo, 2),
            (ColumnName::InProgress, 3),
            (ColumnName::Done, 4),
        ]
    );

    // A second bootstrap is refused instead of producing eight columns
    assert!(matches!(
        fx.services.columns.create_default_columns(project.id).await,
        Err(ServiceError::Conflict(_))
    ));
    assert_eq!(fx.services.columns.list_by_project(project.id).await.unwrap().len(), 4);

    let done = fx
        .services
        .columns
        .find_by_name(project.id, ColumnName::Done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.position, 4);
    assert_eq!(fx.services.columns.get(done.id).await.unwrap(), done);

    assert!(matches!(
        fx.services.columns.create_default_columns(9_999).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_project_rules() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let projects = &fx.services.projects;

    assert!(matches!(
        projects.create("Launch", None, 9_999, ada.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        projects.create(" ", None, workspace.id, ada.id).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        projects.list_by_workspace(9_999).await,
        Err(ServiceError::NotFound(_))
    ));

    let (project, columns) = fx.project(&workspace, &ada).await;
    let updated = projects
        .update(project.id, "Relaunch", Some("Second try"))
        .await
        .unwrap();
    assert_eq!(updated.name, "Relaunch");
    assert_eq!(updated.workspace_id, workspace.id);

    projects.delete(project.id).await.unwrap();
    assert!(matches!(projects.delete(project.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(
        fx.services.columns.get(columns[0].id).await,
        Err(ServiceError::NotFound(_))
    ));
}

// Tasks

#[tokio::test]
async fn test_task_create_lands_in_backlog_with_medium_priority() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, columns) = fx.project(&workspace, &ada).await;

    let task = fx
        .services
        .tasks
        .create(
            TaskDraft {
                assigned_to_id: Some(9_999),
                ..TaskDraft::titled("Write docs")
            },
            project.id,
            ada.id,
        )
        .await
        .unwrap();

    assert_eq!(task.column_id, column(&columns, ColumnName::Backlog).id);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.created_by_id, ada.id);
    // Unknown assignees are dropped on create
    assert_eq!(task.assigned_to_id, None);
    assert_eq!(task.completed_at, None);
}

#[tokio::test]
async fn test_task_create_errors() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, _) = fx.project(&workspace, &ada).await;
    let tasks = &fx.services.tasks;

    assert!(matches!(
        tasks.create(TaskDraft::titled("x"), 9_999, ada.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        tasks.create(TaskDraft::titled("  "), project.id, ada.id).await,
        Err(ServiceError::Validation(msg)) if msg == "Task title is required"
    ));
}

#[tokio::test]
async fn test_task_update_rules() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, _) = fx.project(&workspace, &ada).await;
    let tasks = &fx.services.tasks;

    let task = tasks
        .create(
            TaskDraft {
                priority: Some(Priority::High),
                assigned_to_id: Some(bob.id),
                ..TaskDraft::titled("Triage")
            },
            project.id,
            ada.id,
        )
        .await
        .unwrap();
    assert_eq!(task.assigned_to_id, Some(bob.id));

    let updated = tasks
        .update(task.id, TaskDraft::titled("Triage inbox"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Triage inbox");
    assert_eq!(updated.priority, Priority::Medium);
    assert_eq!(updated.assigned_to_id, None);
    assert_eq!(updated.column_id, task.column_id);
    assert_eq!(updated.project_id, task.project_id);

    assert!(matches!(
        tasks
            .update(
                task.id,
                TaskDraft {
                    assigned_to_id: Some(9_999),
                    ..TaskDraft::titled("Triage inbox")
                }
            )
            .await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        tasks.update(task.id, TaskDraft::titled("")).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        tasks.update(9_999, TaskDraft::titled("x")).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_move_to_column() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, columns) = fx.project(&workspace, &ada).await;
    let (_, other_columns) = fx
        .services
        .projects
        .create("Other", None, workspace.id, ada.id)
        .await
        .unwrap();
    let tasks = &fx.services.tasks;

    let task = tasks
        .create(TaskDraft::titled("Ship"), project.id, ada.id)
        .await
        .unwrap();

    // Same column: returned unchanged, nothing written
    let same = tasks.move_to_column(task.id, task.column_id).await.unwrap();
    assert_eq!(same, task);

    let todo = column(&columns, ColumnName::ToDo);
    let moved = tasks.move_to_column(task.id, todo.id).await.unwrap();
    assert_eq!(moved.column_id, todo.id);
    assert_eq!(moved.completed_at, None);

    let done = column(&columns, ColumnName::Done);
    let finished = tasks.move_to_column(task.id, done.id).await.unwrap();
    assert!(finished.completed_at.is_some());

    let reopened = tasks.move_to_column(task.id, todo.id).await.unwrap();
    assert_eq!(reopened.completed_at, None);

    for foreign in &other_columns {
        assert!(matches!(
            tasks.move_to_column(task.id, foreign.id).await,
            Err(ServiceError::Validation(msg)) if msg == "Column does not belong to task's project"
        ));
    }

    assert!(matches!(
        tasks.move_to_column(task.id, 9_999).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        tasks.move_to_column(9_999, todo.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_assign_and_delete() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let bob = fx.user("Bob").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, _) = fx.project(&workspace, &ada).await;
    let tasks = &fx.services.tasks;

    let task = tasks
        .create(TaskDraft::titled("Review"), project.id, ada.id)
        .await
        .unwrap();

    assert_eq!(tasks.assign(task.id, Some(bob.id)).await.unwrap().assigned_to_id, Some(bob.id));
    assert_eq!(tasks.assign(task.id, None).await.unwrap().assigned_to_id, None);
    assert!(matches!(
        tasks.assign(task.id, Some(9_999)).await,
        Err(ServiceError::NotFound(_))
    ));

    tasks.delete(task.id).await.unwrap();
    assert!(matches!(tasks.get(task.id).await, Err(ServiceError::NotFound(_))));
    assert!(matches!(tasks.delete(task.id).await, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn test_task_listings_newest_first() {
    let fx = Fixture::new();
    let ada = fx.user("Ada").await;
    let workspace = fx.workspace(&ada, "Engineering").await;
    let (project, columns) = fx.project(&workspace, &ada).await;
    let tasks = &fx.services.tasks;

    let first = tasks.create(TaskDraft::titled("First"), project.id, ada.id).await.unwrap();
    let second = tasks.create(TaskDraft::titled("Second"), project.id, ada.id).await.unwrap();

    let listed: Vec<i64> = tasks
        .list_by_project(project.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(listed, vec![second.id, first.id]);

    let backlog = column(&columns, ColumnName::Backlog);
    assert_eq!(tasks.list_by_column(backlog.id).await.unwrap().len(), 2);
    assert!(tasks
        .list_by_column(column(&columns, ColumnName::Done).id)
        .await
        .unwrap()
        .is_empty());

    assert!(matches!(
        tasks.list_by_project(9_999).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        tasks.list_by_column(9_999).await,
        Err(ServiceError::NotFound(_))
    ));
}

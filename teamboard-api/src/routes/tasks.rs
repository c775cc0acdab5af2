/// Task endpoints
///
/// Every endpoint walks task → project → workspace and applies the access
/// predicate before touching the task.
///
/// # Endpoints
///
/// - `POST/GET /api/projects/:id/tasks` (and the workspace-scoped alias)
/// - `GET /api/columns/:id/tasks`
/// - `GET/PUT/DELETE /api/tasks/:id`
/// - `PATCH /api/tasks/:id/column/:column_id` - Move to another column
/// - `PATCH /api/tasks/:id/assignee` - Set or clear the assignee

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    routes::{access, views, views::TaskView},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use teamboard_shared::auth::bearer::AuthContext;
use teamboard_shared::models::task::Priority;
use teamboard_shared::services::tasks::TaskDraft;
use validator::Validate;

/// Create or update request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: String,

    pub description: Option<String>,

    /// `LOW`, `MEDIUM` or `HIGH`; `MEDIUM` when omitted
    pub priority: Option<Priority>,

    /// `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,

    pub assigned_to_id: Option<i64>,
}

impl From<TaskRequest> for TaskDraft {
    fn from(req: TaskRequest) -> Self {
        TaskDraft {
            title: req.title,
            description: req.description,
            priority: req.priority,
            due_date: req.due_date,
            assigned_to_id: req.assigned_to_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// `null` unassigns
    pub user_id: Option<i64>,
}

async fn create_in_project(
    state: &AppState,
    auth: &AuthContext,
    project_id: i64,
    req: TaskRequest,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    req.validate()?;

    let task = state
        .services
        .tasks
        .create(req.into(), project_id, auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(views::task(state, task).await?)))
}

async fn list_in_project(state: &AppState, project_id: i64) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = state.services.tasks.list_by_project(project_id).await?;
    Ok(Json(views::tasks(state, tasks).await?))
}

/// Create a task in the project's BACKLOG column
///
/// # Errors
///
/// - `400 Bad Request`: Blank title
/// - `403 Forbidden`: Caller has no access to the workspace
/// - `404 Not Found`: Unknown project
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    access::project(&state, &auth, project_id).await?;
    create_in_project(&state, &auth, project_id, req).await
}

pub async fn create_workspace_project_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    access::project_in(&state, &auth, workspace_id, project_id).await?;
    create_in_project(&state, &auth, project_id, req).await
}

pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<TaskView>>> {
    access::project(&state, &auth, project_id).await?;
    list_in_project(&state, project_id).await
}

pub async fn list_workspace_project_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<TaskView>>> {
    access::project_in(&state, &auth, workspace_id, project_id).await?;
    list_in_project(&state, project_id).await
}

pub async fn list_column_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<i64>,
) -> ApiResult<Json<Vec<TaskView>>> {
    access::column(&state, &auth, column_id).await?;

    let tasks = state.services.tasks.list_by_column(column_id).await?;
    Ok(Json(views::tasks(&state, tasks).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<TaskView>> {
    let task = access::task(&state, &auth, task_id).await?;
    Ok(Json(views::task(&state, task).await?))
}

/// Replace title, description, priority, due date and assignee
///
/// The column never changes here; use the move endpoint.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<Json<TaskView>> {
    access::task(&state, &auth, task_id).await?;
    req.validate()?;

    let task = state.services.tasks.update(task_id, req.into()).await?;
    Ok(Json(views::task(&state, task).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<i64>,
) -> ApiResult<StatusCode> {
    access::task(&state, &auth, task_id).await?;

    state.services.tasks.delete(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a task to another column of its project
///
/// # Errors
///
/// - `400 Bad Request`: Column belongs to another project
/// - `404 Not Found`: Unknown task or column
pub async fn move_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, column_id)): Path<(i64, i64)>,
) -> ApiResult<Json<TaskView>> {
    access::task(&state, &auth, task_id).await?;

    let task = state.services.tasks.move_to_column(task_id, column_id).await?;
    Ok(Json(views::task(&state, task).await?))
}

pub async fn assign_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<i64>,
    ApiJson(req): ApiJson<AssignRequest>,
) -> ApiResult<Json<TaskView>> {
    access::task(&state, &auth, task_id).await?;

    let task = state.services.tasks.assign(task_id, req.user_id).await?;
    Ok(Json(views::task(&state, task).await?))
}

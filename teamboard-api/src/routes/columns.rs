//! Board column listings, ordered by position.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{access, views, views::ColumnView},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use teamboard_shared::auth::bearer::AuthContext;

pub async fn list_project_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(project_id): Path<i64>,
) -> ApiResult<Json<Vec<ColumnView>>> {
    access::project(&state, &auth, project_id).await?;

    let columns = state.services.columns.list_by_project(project_id).await?;
    Ok(Json(views::columns(columns)))
}

pub async fn list_workspace_project_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Vec<ColumnView>>> {
    access::project_in(&state, &auth, workspace_id, project_id).await?;

    let columns = state.services.columns.list_by_project(project_id).await?;
    Ok(Json(views::columns(columns)))
}

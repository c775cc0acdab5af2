//! Bearer authentication for protected routes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use teamboard_shared::auth::bearer::{resolve_caller, AuthContext};

use crate::{app::AppState, error::ApiError};

/// Resolves the caller from `Authorization: Bearer <access token>` and
/// inserts an [`AuthContext`] into the request extensions
///
/// Any failure short-circuits with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let user = resolve_caller(state.store.as_ref(), state.jwt_secret(), header.as_deref()).await?;

    req.extensions_mut().insert(AuthContext { user });

    Ok(next.run(req).await)
}

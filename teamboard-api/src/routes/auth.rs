/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get tokens
/// - `POST /api/auth/refresh` - Exchange a refresh token (sent as bearer) for a new access token
/// - `GET /api/auth/me` - Current user profile
/// - `PUT /api/auth/me` - Update name, email or avatar initials
/// - `PUT /api/auth/me/password` - Change password

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    routes::views::UserView,
};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use teamboard_shared::auth::bearer::{extract_bearer_token, AuthContext};
use teamboard_shared::services::users::{ProfileUpdate, Registration, TokenPair};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Derived from the name when omitted
    #[validate(length(max = 4, message = "Avatar initials must be at most 4 characters"))]
    pub avatar_initials: Option<String>,
}

/// Plain confirmation body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Login and refresh response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// The login email
    pub username: String,
    /// Access token lifetime in seconds
    pub expires_in: String,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            username: pair.username,
            expires_in: pair.expires_in.to_string(),
        }
    }
}

/// Profile update request; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 4, message = "Avatar initials must be at most 4 characters"))]
    pub avatar_initials: Option<String>,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Register a new user
///
/// ```text
/// POST /api/auth/register
/// {"name": "Ada Lovelace", "email": "ada@example.com", "password": "analytical"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    state
        .services
        .users
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            avatar_initials: req.avatar_initials,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "User created successfully".to_string(),
    }))
}

/// Login endpoint
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let pair = state
        .services
        .users
        .authenticate(&req.email, &req.password)
        .await?;

    Ok(Json(pair.into()))
}

/// Token refresh endpoint
///
/// ```text
/// POST /api/auth/refresh
/// Authorization: Bearer <refresh token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing, invalid or expired refresh token
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Json<TokenResponse>> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = extract_bearer_token(header)?;

    let pair = state.services.users.refresh(token).await?;

    Ok(Json(pair.into()))
}

/// Current user profile
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<UserView> {
    Json(auth.user.into())
}

/// Update the caller's profile
///
/// Changing the email invalidates issued tokens, which carry the email as
/// their subject.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserView>> {
    req.validate()?;

    let user = state
        .services
        .users
        .update_profile(
            auth.user_id(),
            ProfileUpdate {
                name: req.name,
                email: req.email,
                avatar_initials: req.avatar_initials,
            },
        )
        .await?;

    Ok(Json(user.into()))
}

/// Change the caller's password
///
/// # Errors
///
/// - `400 Bad Request`: New password too short
/// - `401 Unauthorized`: Current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    state
        .services
        .users
        .change_password(auth.user_id(), &req.current_password, &req.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

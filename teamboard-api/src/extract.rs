//! Request extractors whose rejections use the API error body

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON body extractor
///
/// Behaves like [`axum::Json`], but malformed bodies, missing fields and
/// unknown enum values are rejected as `400 bad_request` with the usual
/// `{error, message}` body instead of axum's plain-text 4xx responses.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

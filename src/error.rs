// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application error taxonomy and its HTTP rendering.
//!
//! Handlers return [`AppError`]. Converting it into an [`ApiError`] is the
//! single place where internal failures are logged with their detail; the
//! response body only ever carries a fixed, client-safe message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthError, PasswordError, UNAUTHENTICATED_MESSAGE};
use crate::policy::ValidationError;
use crate::storage::StorageError;

/// Client-facing message for hashing, signing and other internal failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

const FORBIDDEN_MESSAGE: &str = "you do not have permission to modify this resource";
const DUPLICATE_EMAIL_MESSAGE: &str = "email is already taken";
const UNAVAILABLE_MESSAGE: &str = "service temporarily unavailable";

/// Every failure a request can end in.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    /// Resource kind that was not found (or not visible)
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("email is already taken")]
    DuplicateEmail,

    #[error("hashing failed: {0}")]
    HashingFailed(String),

    #[error("token signing failed: {0}")]
    TokenSigningFailed(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(resource) => AppError::NotFound(resource),
            StorageError::DuplicateEmail => AppError::DuplicateEmail,
            other => AppError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        AppError::HashingFailed(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::SigningFailed(detail) => AppError::TokenSigningFailed(detail),
            _ => AppError::Unauthenticated,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            INTERNAL_ERROR_MESSAGE,
        )
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Validation(v) => ApiError::bad_request(v.to_string()),
            AppError::Unauthenticated => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                UNAUTHENTICATED_MESSAGE,
            ),
            AppError::Forbidden => {
                ApiError::new(StatusCode::FORBIDDEN, "forbidden", FORBIDDEN_MESSAGE)
            }
            AppError::NotFound(resource) => ApiError::not_found(resource),
            AppError::DuplicateEmail => {
                ApiError::new(StatusCode::CONFLICT, "duplicate_email", DUPLICATE_EMAIL_MESSAGE)
            }
            AppError::HashingFailed(_) | AppError::TokenSigningFailed(_) => {
                tracing::error!(error = %e, "request failed with internal error");
                ApiError::internal()
            }
            AppError::StorageUnavailable(_) => {
                tracing::error!(error = %e, "storage failure");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    UNAVAILABLE_MESSAGE,
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(error: AppError) -> (StatusCode, serde_json::Value, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        (status, serde_json::from_str(&raw).unwrap(), raw)
    }

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("post");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "post not found");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.code, "validation_error");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data","error_code":"validation_error"}"#);
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (AppError::Validation(ValidationError::InvalidEmail), StatusCode::BAD_REQUEST),
            (AppError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound("post"), StatusCode::NOT_FOUND),
            (AppError::DuplicateEmail, StatusCode::CONFLICT),
            (AppError::HashingFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::TokenSigningFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::StorageUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (error, expected) in cases {
            let (status, _, _) = render(error).await;
            assert_eq!(status, expected);
        }
    }

    #[tokio::test]
    async fn validation_message_is_passed_through() {
        let (_, body, _) = render(AppError::Validation(ValidationError::BlankTitle)).await;
        assert_eq!(body["error"], "title must not be blank");
        assert_eq!(body["error_code"], "validation_error");
    }

    #[tokio::test]
    async fn internal_detail_never_reaches_the_body() {
        for error in [
            AppError::HashingFailed("argon2 params rejected".into()),
            AppError::TokenSigningFailed("argon2 params rejected".into()),
            AppError::StorageUnavailable("argon2 params rejected".into()),
        ] {
            let (_, _, raw) = render(error).await;
            assert!(!raw.contains("argon2"), "{raw}");
        }
    }

    #[tokio::test]
    async fn unauthenticated_matches_auth_rejection_body() {
        let (_, _, from_app) = render(AppError::Unauthenticated).await;

        let response = AuthError::Expired.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(from_app.as_bytes(), &bytes[..]);
    }

    #[test]
    fn storage_errors_map_by_kind() {
        assert!(matches!(
            AppError::from(StorageError::NotFound("account")),
            AppError::NotFound("account")
        ));
        assert!(matches!(
            AppError::from(StorageError::DuplicateEmail),
            AppError::DuplicateEmail
        ));
        assert!(matches!(
            AppError::from(StorageError::Unavailable("lock poisoned".into())),
            AppError::StorageUnavailable(_)
        ));
    }

    #[test]
    fn auth_errors_collapse_to_unauthenticated() {
        assert!(matches!(AppError::from(AuthError::Expired), AppError::Unauthenticated));
        assert!(matches!(
            AppError::from(AuthError::SigningFailed("x".into())),
            AppError::TokenSigningFailed(_)
        ));
    }
}

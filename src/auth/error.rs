// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// The variants keep the precise reason for logs and tests. Every variant
/// except [`AuthError::SigningFailed`] renders to the same 401 response, so
/// a client cannot tell an expired token from a forged one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("authorization header is required")]
    MissingAuthHeader,
    /// Header present but not `Bearer <token>`
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token cannot be parsed into the expected claim shape
    #[error("token is malformed")]
    Malformed,
    /// Signature does not match the configured key and algorithm
    #[error("token signature is invalid")]
    InvalidSignature,
    /// `exp` has passed
    #[error("token has expired")]
    Expired,
    /// Token could not be signed
    #[error("token signing failed: {0}")]
    SigningFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
    error_code: &'static str,
}

impl AuthError {
    /// Get the internal reason code for this error (logs only).
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Malformed => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::SigningFailed(_) => "signing_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::SigningFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(reason = self.reason(), "request rejected as unauthenticated");
            AuthErrorBody {
                error: super::UNAUTHENTICATED_MESSAGE,
                error_code: "unauthenticated",
            }
        } else {
            tracing::error!(error = %self, "token service failure");
            AuthErrorBody {
                error: crate::error::INTERNAL_ERROR_MESSAGE,
                error_code: "internal_error",
            }
        };
        (status, Json(body)).into_response()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! `OptionalAuth` is for public routes whose result depends on who is
//! asking (an owner sees their own unpublished posts).

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedUser, TokenService};
use crate::state::AppState;

/// Pull the bearer token out of the `Authorization` header.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Resolve the caller identity from request headers.
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer(headers)?;
    tokens.authenticate(token)
}

/// Extractor for authenticated callers.
///
/// On routes behind [`super::middleware::require_auth`] the user is already
/// in request extensions and is taken from there. Anywhere else the header
/// is verified here.
///
/// # Example
///
/// ```rust,ignore
/// async fn create_post(
///     Auth(user): Auth,
///     State(state): State<AppState>,
///     Json(request): Json<CreatePostRequest>,
/// ) -> Result<(StatusCode, Json<Post>), AppError> {
///     // user.account_id becomes the post owner
/// }
/// ```
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the user
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().copied() {
            return Ok(Auth(user));
        }

        authenticate(&parts.headers, &state.tokens).map(Auth)
    }
}

/// Optional authentication extractor.
///
/// Absent or invalid credentials yield `None` instead of a rejection, so an
/// anonymous caller is treated the same as one with a bad token.
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl OptionalAuth {
    pub fn account_id(&self) -> Option<crate::models::AccountId> {
        self.0.map(|user| user.account_id)
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(user)) => Ok(OptionalAuth(Some(user))),
            Err(error) => {
                if !matches!(error, AuthError::MissingAuthHeader) {
                    tracing::debug!(reason = error.reason(), "ignoring invalid optional credentials");
                }
                Ok(OptionalAuth(None))
            }
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{
        password::{hash_password_blocking, verify_against_dummy, verify_password_blocking},
        ClearTextPassword, HashedPassword, IssuedToken,
    },
    error::AppError,
    models::{CredentialsRequest, NewAccount, TokenResponse},
    policy,
    state::AppState,
    storage::StorageError,
};

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_at: issued.expires_at,
        }
    }
}

/// Register a new account and return a token for it.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let CredentialsRequest { email, password } = request;
    let password = ClearTextPassword::new(password);
    policy::can_register(&email, password.char_count())?;

    let verifier = hash_password_blocking(password).await?;
    let account_id = state.store.create_account(NewAccount {
        email,
        password_hash: verifier.into_phc_string(),
    })?;

    let issued = state.tokens.issue(account_id)?;
    tracing::info!(account_id = %account_id, "account registered");

    Ok((StatusCode::CREATED, Json(issued.into())))
}

/// Exchange email and password for a token.
///
/// Every failure (unknown email, wrong password, locked or inactive
/// account) produces the same 401.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let CredentialsRequest { email, password } = request;
    let password = ClearTextPassword::new(password);

    let account = match state.store.find_account_by_email(&email) {
        Ok(account) => account,
        Err(StorageError::NotFound(_)) => {
            let _ = tokio::task::spawn_blocking(move || verify_against_dummy(&password)).await;
            tracing::debug!("login rejected: unknown email");
            return Err(AppError::Unauthenticated);
        }
        Err(e) => return Err(e.into()),
    };

    let verifier = HashedPassword::from_phc_string(account.password_hash.as_str())?;
    let verified = verify_password_blocking(password, verifier).await?;
    if !verified {
        tracing::debug!(account_id = %account.id, "login rejected: wrong password");
        return Err(AppError::Unauthenticated);
    }
    if !account.is_active || account.is_locked {
        tracing::info!(
            account_id = %account.id,
            is_active = account.is_active,
            is_locked = account.is_locked,
            "login rejected: account disabled"
        );
        return Err(AppError::Unauthenticated);
    }

    let issued = state.tokens.issue(account.id)?;
    Ok(Json(issued.into()))
}

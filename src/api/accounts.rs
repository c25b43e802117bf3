// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::{password::hash_password_blocking, Auth, ClearTextPassword},
    error::AppError,
    models::{AccountChanges, AccountId, AccountProfile, AccountResponse, UpdateAccountRequest},
    policy,
    state::AppState,
};

/// Get the caller's own account.
#[utoipa::path(
    get,
    path = "/v1/accounts/me",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = AccountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.store.find_account(user.account_id)?;
    Ok(Json(account.into()))
}

/// Change the caller's email and/or password.
#[utoipa::path(
    patch,
    path = "/v1/accounts/me",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = AccountResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_me(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    let UpdateAccountRequest { email, password } = request;
    let mut changes = AccountChanges::default();

    if let Some(email) = email {
        policy::validate_email(&email)?;
        changes.email = Some(email);
    }

    if let Some(password) = password {
        let password = ClearTextPassword::new(password);
        policy::validate_password_length(password.char_count())?;
        changes.password_hash = Some(hash_password_blocking(password).await?.into_phc_string());
    }

    if !changes.is_empty() {
        let password_changed = changes.password_hash.is_some();
        state.store.update_account(user.account_id, changes)?;
        tracing::info!(
            account_id = %user.account_id,
            password_changed,
            "account updated"
        );
    }

    let account = state.store.find_account(user.account_id)?;
    Ok(Json(account.into()))
}

/// Public profile of any account: id and creation time only.
#[utoipa::path(
    get,
    path = "/v1/accounts/{id}",
    params(("id" = u64, Path, description = "Account identifier")),
    tag = "Accounts",
    responses(
        (status = 200, body = AccountProfile),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = state.store.find_account(account_id)?;
    Ok(Json(account.into()))
}

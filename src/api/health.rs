// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

const OK: &str = "ok";

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// `ok` when storage answers, `degraded` otherwise
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub service: String,
    /// `ok` or `unavailable`
    pub storage: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

fn storage_status(state: &AppState) -> &'static str {
    match state.store.health_check() {
        Ok(()) => OK,
        Err(e) => {
            tracing::warn!(error = %e, "storage health check failed");
            "unavailable"
        }
    }
}

/// Report whether the account and post store can serve reads.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = ReadyResponse),
        (status = 503, description = "Store unreachable", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let storage = storage_status(&state);
    let (status, overall) = if storage == OK {
        (StatusCode::OK, OK)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = ReadyResponse {
        status: overall.to_string(),
        checks: HealthChecks {
            service: OK.to_string(),
            storage: storage.to_string(),
        },
    };
    (status, Json(body))
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: OK.to_string(),
    })
}

/// Same check as `/health`, on the conventional readiness path.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, body = ReadyResponse),
        (status = 503, body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenConfig, TokenService};

    #[tokio::test]
    async fn in_memory_store_is_ready() {
        let state = AppState::in_memory(TokenService::new(TokenConfig::new(
            &b"health-handler-test-secret-32-bytes-long"[..],
        )));

        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.storage, "ok");
    }

    #[tokio::test]
    async fn liveness_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}

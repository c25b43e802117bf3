// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to the protected router subtree so the
//! token is verified before any handler (or request body extractor) runs.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/posts", post(create_post))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         require_auth,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::authenticate;
use crate::state::AppState;

/// Reject unauthenticated requests; otherwise store the caller in request
/// extensions for the [`super::Auth`] extractor.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &state.tokens) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, TokenConfig, TokenService};
    use crate::models::AccountId;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(state: AppState, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |Auth(user): Auth| {
                    let hits = Arc::clone(&hits);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        user.account_id.to_string()
                    }
                }),
            )
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn test_state() -> AppState {
        AppState::in_memory(TokenService::new(TokenConfig::new(
            &b"middleware-test-secret-32-bytes-long"[..],
        )))
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let state = test_state();
        let token = state.tokens.issue(AccountId(12)).unwrap().token;
        let hits = Arc::new(AtomicUsize::new(0));

        let response = test_app(state, Arc::clone(&hits))
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"12");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_or_bad_token_never_reaches_handler() {
        let state = test_state();
        let hits = Arc::new(AtomicUsize::new(0));
        let app = test_app(state, Arc::clone(&hits));

        for header in [None, Some("Bearer garbage"), Some("Token abc")] {
            let mut builder = Request::builder().uri("/protected");
            if let Some(value) = header {
                builder = builder.header("Authorization", value);
            }

            let response = app
                .clone()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

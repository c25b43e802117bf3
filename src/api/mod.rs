// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    models::{
        AccountId, AccountProfile, AccountResponse, CreatePostRequest, CredentialsRequest, Post, PostId,
        TokenResponse, UpdateAccountRequest, UpdatePostRequest,
    },
    state::AppState,
};

pub mod accounts;
pub mod auth;
pub mod health;
pub mod posts;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/accounts/{id}", get(accounts::get_account))
        .route("/accounts/{id}/posts", get(posts::list_account_posts));

    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/{id}",
            patch(posts::update_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/accounts/me", get(accounts::get_me).patch(accounts::update_me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let v1_routes = public_routes.merge(protected_routes).with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        posts::update_post,
        posts::delete_post,
        posts::list_account_posts,
        accounts::get_me,
        accounts::update_me,
        accounts::get_account,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AccountId,
            PostId,
            Post,
            AccountResponse,
            AccountProfile,
            TokenResponse,
            CredentialsRequest,
            CreatePostRequest,
            UpdatePostRequest,
            UpdateAccountRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Posts", description = "Blog posts"),
        (name = "Accounts", description = "Account profiles"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

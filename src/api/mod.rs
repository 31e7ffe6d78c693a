// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
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

use crate::{auth::auth_middleware, state::AppState};

pub mod health;
pub mod login;
pub mod time;
pub mod users;

/// Build the application router.
///
/// Every route sits behind the gateway middleware; which ones need a token
/// is decided by the allow-list in `state`. CORS is the outermost layer so
/// that pre-flight requests are answered before the gateway sees them.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/api/login", post(login::login))
        .route("/api/me", get(users::get_current_user))
        .route("/time", post(time::current_time))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    routes.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive()),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        login::login,
        users::get_current_user,
        time::current_time,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            login::LoginRequest,
            login::LoginResponse,
            users::UserMeResponse,
            time::TimeRequest,
            time::TimeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Users", description = "Authenticated identity"),
        (name = "Time", description = "Server time echo"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
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

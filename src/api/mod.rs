// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
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
    auth::{
        middleware::{authenticate, authorize},
        routes::{
            DOCS_PREFIX, ERROR_PATH, LIVENESS_PATH, LOGIN_PATH, LOGOUT_PATH, OPENAPI_PATH,
            REGISTRATION_PATH,
        },
        Identity, Principal, Role,
    },
    models::{
        AdminRevokeRequest, AdminRevokeResponse, LoginRequest, LoginResponse, LogoutResponse,
        RegisterRequest, RevocationStats, RevocationStatus,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

pub const CURRENT_USER_PATH: &str = "/v1/users/me";
pub const ADMIN_REVOCATIONS_PATH: &str = "/v1/admin/revocations";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, post(auth::login))
        .route(LOGOUT_PATH, post(auth::logout))
        .route(REGISTRATION_PATH, post(users::register))
        .route(CURRENT_USER_PATH, get(users::get_current_user))
        .route(
            ADMIN_REVOCATIONS_PATH,
            get(admin::revocation_stats).post(admin::revoke_token),
        )
        .route(ERROR_PATH, get(health::error_page))
        .route(LIVENESS_PATH, get(health::liveness))
        .merge(SwaggerUi::new(DOCS_PREFIX).url(OPENAPI_PATH, ApiDoc::openapi()))
        .fallback(health::not_found)
        // Layers run bottom-up: authenticate, then authorize.
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

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

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        users::register,
        users::get_current_user,
        admin::revoke_token,
        admin::revocation_stats,
        health::liveness,
        health::error_page
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LogoutResponse,
            RevocationStatus,
            RegisterRequest,
            AdminRevokeRequest,
            AdminRevokeResponse,
            RevocationStats,
            Principal,
            Identity,
            Role,
            users::UserMeResponse,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Token issuance and self-revocation"),
        (name = "Users", description = "Registration and current identity"),
        (name = "Admin", description = "Administrative revocation"),
        (name = "Health", description = "Liveness and error path")
    )
)]
struct ApiDoc;

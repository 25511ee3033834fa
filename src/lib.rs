pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
pub mod validator;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::security::SecurityConfig;
use crate::handlers::generate::{
    AppState, generate_handler, method_not_allowed_handler, preflight_handler,
};
use crate::handlers::metrics::metrics_handler;
use crate::middleware::rate_limit::rate_limit_middleware;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .route(
            "/v1/generate",
            post(generate_handler)
                .options(preflight_handler)
                .fallback(method_not_allowed_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origin = security
        .allowed_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|e| {
            tracing::error!(
                "Invalid CORS origin '{}': {}. Using fallback.",
                security.allowed_origin,
                e
            );
            HeaderValue::from_static("*")
        });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(
            security.preflight_max_age_secs,
        ))
}

//! Route definitions.

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::auth::auth_middleware;

use super::handlers;
use super::state::AppState;

/// Create the application router.
///
/// Public routes handle account and session management; everything under the
/// protected router passes through the access gate first.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/logout", post(handlers::logout))
        .route("/auth-status", get(handlers::auth_status));

    let protected = Router::new()
        .route(
            "/tickets",
            post(handlers::create_ticket).get(handlers::list_tickets),
        )
        .route("/userTickets", get(handlers::list_user_tickets))
        .route(
            "/tickets/{id}/status",
            patch(handlers::update_ticket_status),
        )
        .layer(middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));

    let cors = build_cors_layer(state.auth.allowed_origins());

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer from configured origins.
///
/// Credentials are always allowed since the session rides in a cookie, which
/// rules out a wildcard origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<_> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

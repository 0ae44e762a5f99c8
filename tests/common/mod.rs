//! Test utilities and common setup.

use axum::Router;
use ticketd::api;
use ticketd::auth::{AuthConfig, AuthState};
use ticketd::db::Database;
use ticketd::ticket::{TicketRepository, TicketService};
use ticketd::user::{UserRepository, UserService};

/// Create a test AuthConfig with a JWT secret for testing.
fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some("test-secret-for-integration-tests-minimum-32-chars".to_string()),
        ..AuthConfig::default()
    }
}

/// Create a test application with all services initialized.
pub async fn test_app() -> Router {
    // Use in-memory database for tests
    let db = Database::in_memory().await.unwrap();

    let auth_state = AuthState::new(test_auth_config());

    let user_service = UserService::new(UserRepository::new(db.pool().clone()));
    let ticket_service = TicketService::new(TicketRepository::new(db.pool().clone()));

    let state = api::AppState::new(user_service, ticket_service, auth_state);
    api::create_router(state)
}

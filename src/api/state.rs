//! Shared application state.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::AuthState;
use crate::ticket::TicketService;
use crate::user::UserService;

/// Application state shared across all handlers.
///
/// Services are constructed once at startup and injected here; nothing in the
/// request path reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub tickets: Arc<TicketService>,
    pub auth: AuthState,
}

impl AppState {
    pub fn new(users: UserService, tickets: TicketService, auth: AuthState) -> Self {
        Self {
            users: Arc::new(users),
            tickets: Arc::new(tickets),
            auth,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

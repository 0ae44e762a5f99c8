//! HTTP request handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use crate::auth::{
    CurrentUser, RequireAdmin, RequiredRole, TOKEN_COOKIE, token_from_cookie_header,
};
use crate::ticket::{CreateTicketRequest, Ticket};
use crate::user::{CreateUserRequest, UserInfo};

use super::error::{ApiError, ApiResult};
use super::state::AppState;

/// Health check endpoint.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Request body for signin.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Response body for signup and signin.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user: UserInfo,
}

/// Response body for a status update.
#[derive(Debug, Serialize)]
pub struct TicketUpdateResponse {
    pub message: String,
    pub ticket: Ticket,
}

/// Build the session cookie carrying a freshly issued token.
fn session_cookie(token: &str, ttl_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        TOKEN_COOKIE, token, ttl_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build an expired cookie that clears the session.
fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

fn with_session_cookie(status: StatusCode, cookie: String, body: impl Serialize) -> Response {
    // Json reports its own serialization failures as a 500 response.
    (status, [(header::SET_COOKIE, cookie)], Json(body)).into_response()
}

/// Register a new account and start a session.
///
/// POST /signup
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<Response> {
    let user = state.users.signup(request).await?;
    let token = state.auth.issue_token(&user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "User signed up");

    let cookie = session_cookie(&token, state.auth.token_ttl_secs(), state.auth.secure_cookies());
    let body = SessionResponse {
        message: "User registered successfully".to_string(),
        user: UserInfo::from(user),
    };

    Ok(with_session_cookie(StatusCode::CREATED, cookie, body))
}

/// Sign in with email and password.
///
/// POST /signin
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> ApiResult<Response> {
    let user = state
        .users
        .verify_credentials(&request.email, &request.password)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid email or password."))?;

    let token = state.auth.issue_token(&user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "User signed in");

    let cookie = session_cookie(&token, state.auth.token_ttl_secs(), state.auth.secure_cookies());
    let body = SessionResponse {
        message: "Signed in successfully".to_string(),
        user: UserInfo::from(user),
    };

    Ok(with_session_cookie(StatusCode::OK, cookie, body))
}

/// End the session by clearing the cookie. No token required.
///
/// POST /logout
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(state.auth.secure_cookies());
    with_session_cookie(
        StatusCode::OK,
        cookie,
        json!({ "message": "Signed out successfully" }),
    )
}

/// Report whether the carried token is a valid session.
///
/// GET /auth-status
///
/// Never fails: a missing or invalid token yields `authenticated: false`.
#[instrument(skip(state, headers))]
pub async fn auth_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let token = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| token_from_cookie_header(cookies, TOKEN_COOKIE));

    match state.auth.authorize(token, RequiredRole::Any) {
        Ok(claims) => Json(json!({
            "authenticated": true,
            "user": {
                "id": claims.sub,
                "email": claims.email,
                "role": claims.role,
            }
        })),
        Err(_) => Json(json!({ "authenticated": false })),
    }
}

/// Create a ticket owned by the authenticated user.
///
/// POST /tickets
#[instrument(skip(state, user, request))]
pub async fn create_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTicketRequest>,
) -> ApiResult<Json<Ticket>> {
    let ticket = state.tickets.create_ticket(user.id(), request).await?;
    Ok(Json(ticket))
}

/// List every ticket in the system. Admins only.
///
/// GET /tickets
#[instrument(skip(state, _admin))]
pub async fn list_tickets(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<Json<Vec<Ticket>>> {
    let tickets = state.tickets.list_all().await?;
    Ok(Json(tickets))
}

/// List the authenticated user's own tickets.
///
/// GET /userTickets
#[instrument(skip(state, user))]
pub async fn list_user_tickets(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Ticket>>> {
    let tickets = state.tickets.list_owned(user.id()).await?;
    Ok(Json(tickets))
}

/// Update a ticket's status. Admins only.
///
/// PATCH /tickets/{id}/status
#[instrument(skip(state, _admin, request))]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(ticket_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TicketUpdateResponse>> {
    let ticket = state.tickets.set_status(&ticket_id, &request.status).await?;

    Ok(Json(TicketUpdateResponse {
        message: "Ticket status updated".to_string(),
        ticket,
    }))
}

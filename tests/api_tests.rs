//! API integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::test_app;

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let body = match body {
        Some(value) => Body::from(serde_json::to_string(&value).unwrap()),
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Extract the `token=...` pair from a Set-Cookie header for reuse as a
/// request Cookie header.
fn session_cookie_from(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .expect("response should carry a session cookie");
    set_cookie
        .split(';')
        .next()
        .expect("cookie should have a name=value pair")
        .to_string()
}

/// Sign up a user and return their session cookie.
async fn signup(app: &Router, email: &str, password: &str, role: Option<&str>) -> String {
    let mut body = json!({ "email": email, "password": password });
    if let Some(role) = role {
        body["role"] = json!(role);
    }

    let response = send_json(app, Method::POST, "/signup", None, Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie_from(&response)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let response = send_json(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_signup_success() {
    let app = test_app().await;

    let response = send_json(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "alice@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = session_cookie_from(&response);
    assert!(cookie.starts_with("token="));

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["role"], "USER");
    assert!(json["user"]["id"].as_str().unwrap().starts_with("usr_"));
    // The password never appears in any response.
    assert!(json["user"].get("password").is_none());
    assert!(json["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let app = test_app().await;

    signup(&app, "dup@example.com", "password123", None).await;

    let response = send_json(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({ "email": "dup@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "DUPLICATE_USER");
}

/// Self-registration with an ADMIN role is accepted as-is. This pins the
/// open-registration behavior so any future tightening shows up as a test
/// change.
#[tokio::test]
async fn test_signup_self_registered_admin() {
    let app = test_app().await;

    let cookie = signup(&app, "boss@example.com", "password123", Some("ADMIN")).await;

    // The new account immediately passes the admin gate.
    let response = send_json(&app, Method::GET, "/tickets", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signin_success_and_wrong_password() {
    let app = test_app().await;

    signup(&app, "carol@example.com", "password123", None).await;

    let response = send_json(
        &app,
        Method::POST,
        "/signin",
        None,
        Some(json!({ "email": "carol@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie_from(&response).starts_with("token="));

    let response = send_json(
        &app,
        Method::POST,
        "/signin",
        None,
        Some(json!({ "email": "carol@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown email gets the same answer as a wrong password.
    let response = send_json(
        &app,
        Method::POST,
        "/signin",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_auth_status() {
    let app = test_app().await;

    // Without a cookie: not an error, just unauthenticated.
    let response = send_json(&app, Method::GET, "/auth-status", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], false);

    // Garbage cookie: still a clean false.
    let response = send_json(
        &app,
        Method::GET,
        "/auth-status",
        Some("token=not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], false);

    // With a session cookie.
    let cookie = signup(&app, "dave@example.com", "password123", None).await;
    let response = send_json(&app, Method::GET, "/auth-status", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["authenticated"], true);
    assert_eq!(json["user"]["email"], "dave@example.com");
    assert_eq!(json["user"]["role"], "USER");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app().await;

    // No token at all. Gate rejections use the same {error, code} body as
    // handler errors.
    let response = send_json(&app, Method::GET, "/userTickets", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHENTICATED");
    assert!(json["error"].is_string());

    // A token that is present but not a valid JWT.
    let response = send_json(
        &app,
        Method::GET,
        "/userTickets",
        Some("token=garbage"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_list_all_tickets_is_admin_only() {
    let app = test_app().await;

    let user_cookie = signup(&app, "user@example.com", "password123", None).await;
    let response = send_json(&app, Method::GET, "/tickets", Some(&user_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_cookie = signup(&app, "admin@example.com", "password123", Some("ADMIN")).await;
    let response = send_json(&app, Method::GET, "/tickets", Some(&admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ticket_lifecycle() {
    let app = test_app().await;

    let user_cookie = signup(&app, "reporter@example.com", "password123", None).await;
    let admin_cookie = signup(&app, "triager@example.com", "password123", Some("ADMIN")).await;

    // The user reports an issue; it starts OPEN.
    let response = send_json(
        &app,
        Method::POST,
        "/tickets",
        Some(&user_cookie),
        Some(json!({ "title": "Printer broken", "description": "Paper jam on floor 3" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let ticket = body_json(response).await;
    assert_eq!(ticket["status"], "OPEN");
    let ticket_id = ticket["id"].as_str().unwrap().to_string();
    let owner_id = ticket["userId"].as_str().unwrap().to_string();

    // The admin picks it up.
    let response = send_json(
        &app,
        Method::PATCH,
        &format!("/tickets/{ticket_id}/status"),
        Some(&admin_cookie),
        Some(json!({ "status": "IN_PROGRESS" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ticket"]["status"], "IN_PROGRESS");
    assert_eq!(json["ticket"]["userId"], owner_id);

    // The reporter cannot change status or see the full queue.
    let response = send_json(
        &app,
        Method::PATCH,
        &format!("/tickets/{ticket_id}/status"),
        Some(&user_cookie),
        Some(json!({ "status": "CLOSED" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The admin sees the ticket in the full list with the updated status.
    let response = send_json(&app, Method::GET, "/tickets", Some(&admin_cookie), None).await;
    let all = body_json(response).await;
    let found = all
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == ticket_id.as_str())
        .expect("ticket should appear in admin listing");
    assert_eq!(found["status"], "IN_PROGRESS");

    // The reporter sees it in their own list too.
    let response = send_json(&app, Method::GET, "/userTickets", Some(&user_cookie), None).await;
    let owned = body_json(response).await;
    assert_eq!(owned.as_array().unwrap().len(), 1);
    assert_eq!(owned[0]["id"], ticket_id.as_str());
}

#[tokio::test]
async fn test_user_tickets_only_shows_own() {
    let app = test_app().await;

    let cookie_a = signup(&app, "a@example.com", "password123", None).await;
    let cookie_b = signup(&app, "b@example.com", "password123", None).await;

    send_json(
        &app,
        Method::POST,
        "/tickets",
        Some(&cookie_a),
        Some(json!({ "title": "A's issue", "description": "details" })),
    )
    .await;
    send_json(
        &app,
        Method::POST,
        "/tickets",
        Some(&cookie_b),
        Some(json!({ "title": "B's issue", "description": "details" })),
    )
    .await;

    let response = send_json(&app, Method::GET, "/userTickets", Some(&cookie_a), None).await;
    let owned = body_json(response).await;
    assert_eq!(owned.as_array().unwrap().len(), 1);
    assert_eq!(owned[0]["title"], "A's issue");
}

#[tokio::test]
async fn test_update_status_rejects_unknown_value() {
    let app = test_app().await;

    let user_cookie = signup(&app, "u@example.com", "password123", None).await;
    let admin_cookie = signup(&app, "adm@example.com", "password123", Some("ADMIN")).await;

    let response = send_json(
        &app,
        Method::POST,
        "/tickets",
        Some(&user_cookie),
        Some(json!({ "title": "T", "description": "d" })),
    )
    .await;
    let ticket = body_json(response).await;
    let ticket_id = ticket["id"].as_str().unwrap().to_string();

    let response = send_json(
        &app,
        Method::PATCH,
        &format!("/tickets/{ticket_id}/status"),
        Some(&admin_cookie),
        Some(json!({ "status": "DONE" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_STATUS");

    // The ticket keeps its previous status.
    let response = send_json(&app, Method::GET, "/userTickets", Some(&user_cookie), None).await;
    let owned = body_json(response).await;
    assert_eq!(owned[0]["status"], "OPEN");
}

#[tokio::test]
async fn test_update_status_unknown_ticket() {
    let app = test_app().await;

    let admin_cookie = signup(&app, "adm2@example.com", "password123", Some("ADMIN")).await;

    let response = send_json(
        &app,
        Method::PATCH,
        "/tickets/tkt_missing/status",
        Some(&admin_cookie),
        Some(json!({ "status": "CLOSED" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_create_ticket_rejects_empty_title() {
    let app = test_app().await;

    let cookie = signup(&app, "e@example.com", "password123", None).await;

    let response = send_json(
        &app,
        Method::POST,
        "/tickets",
        Some(&cookie),
        Some(json!({ "title": "  ", "description": "d" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = test_app().await;

    let cookie = signup(&app, "leaver@example.com", "password123", None).await;

    let response = send_json(&app, Method::POST, "/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    // Logout is cookie-clearing only; the token itself stays valid until it
    // expires.
    let response = send_json(&app, Method::GET, "/userTickets", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_header_also_accepted() {
    let app = test_app().await;

    let cookie = signup(&app, "cli@example.com", "password123", None).await;
    let token = cookie.trim_start_matches("token=").to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/userTickets")
                .method(Method::GET)
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

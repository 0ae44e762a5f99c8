//! Access gate and session token codec.
//!
//! `AuthState` issues and validates the signed session token; `authorize` is
//! the single allow/deny decision applied to every protected route, replacing
//! per-handler token checks.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;
use tracing::warn;

use super::{AuthConfig, AuthError, Claims, Role};

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or_else(|| {
        AuthError::InvalidToken("invalid authorization header".to_string())
    })?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken(
            "invalid authorization header".to_string(),
        ));
    }

    match (parts.next(), parts.next()) {
        (Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::InvalidToken(
            "invalid authorization header".to_string(),
        )),
    }
}

/// Find a named cookie's value in a Cookie header.
pub fn token_from_cookie_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Role required to pass the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Any authenticated user.
    Any,
    /// Administrators only.
    Admin,
}

/// Authentication state shared across handlers.
#[derive(Clone)]
pub struct AuthState {
    config: Arc<AuthConfig>,
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
}

impl AuthState {
    /// Create new auth state from config.
    /// Resolves `env:VAR_NAME` syntax in jwt_secret at construction time.
    pub fn new(mut config: AuthConfig) -> Self {
        if let Ok(Some(resolved)) = config.resolve_jwt_secret() {
            config.jwt_secret = Some(resolved);
        }

        let encoding_key = config
            .jwt_secret
            .as_ref()
            .map(|s| EncodingKey::from_secret(s.as_bytes()));
        let decoding_key = config
            .jwt_secret
            .as_ref()
            .map(|s| DecodingKey::from_secret(s.as_bytes()));

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
        }
    }

    /// Get allowed CORS origins from config.
    pub fn allowed_origins(&self) -> &[String] {
        &self.config.allowed_origins
    }

    /// Whether session cookies carry the `Secure` flag.
    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies
    }

    /// Session token lifetime in seconds.
    pub fn token_ttl_secs(&self) -> i64 {
        self.config.token_ttl_secs
    }

    /// Issue a signed session token for a user.
    ///
    /// The secret is a startup precondition (`AuthConfig::validate`); a
    /// missing one here is an internal error, not a client fault.
    pub fn issue_token(&self, user_id: &str, email: &str, role: Role) -> Result<String, AuthError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.config.token_ttl_secs,
        };

        encode(&Header::default(), &claims, encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Validate a session token, checking signature and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = self
            .decoding_key
            .as_ref()
            .ok_or_else(|| AuthError::Internal("no JWT secret configured".to_string()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear(); // Allow missing iss/aud

        let token_data = decode::<Claims>(token, decoding_key, &validation).map_err(|e| {
            warn!("JWT validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// The access gate: decide whether a carried token may perform an
    /// operation requiring `required`.
    ///
    /// Pure decision function over (token, required role); no I/O beyond
    /// decoding.
    pub fn authorize(
        &self,
        token: Option<&str>,
        required: RequiredRole,
    ) -> Result<Claims, AuthError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::MissingToken),
        };

        let claims = self.validate_token(token)?;

        if required == RequiredRole::Admin && claims.role != Role::Admin {
            return Err(AuthError::InsufficientRole("admin role required".to_string()));
        }

        Ok(claims)
    }
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Decoded token claims.
    pub claims: Claims,
}

impl CurrentUser {
    /// Get the user ID.
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    /// Get the user's role.
    pub fn role(&self) -> Role {
        self.claims.role
    }

    /// Check if user is admin.
    pub fn is_admin(&self) -> bool {
        self.claims.is_admin()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Authentication middleware.
///
/// Runs the access gate with `RequiredRole::Any` and injects `CurrentUser`
/// into request extensions. The token is read from the `token` cookie;
/// an `Authorization: Bearer` header is accepted as well for non-browser
/// clients.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(bearer_token_from_header)
        .transpose()?;

    let cookie_token = req
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookie_header| token_from_cookie_header(cookie_header, TOKEN_COOKIE));

    let claims = auth.authorize(bearer.or(cookie_token), RequiredRole::Any)?;

    req.extensions_mut().insert(CurrentUser { claims });

    Ok(next.run(req).await)
}

/// Require admin role.
///
/// Use as an extractor in handlers that require admin access.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientRole(
                "admin role required".to_string(),
            ));
        }

        Ok(RequireAdmin(user))
    }
}

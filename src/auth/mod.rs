//! Authentication module.
//!
//! Provides JWT issuance and validation, the role-based access gate, and
//! password hashing.

mod claims;
mod config;
mod error;
mod middleware;
pub mod password;

pub use claims::{Claims, Role};
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{
    AuthState, CurrentUser, RequireAdmin, RequiredRole, TOKEN_COOKIE, auth_middleware,
    token_from_cookie_header,
};

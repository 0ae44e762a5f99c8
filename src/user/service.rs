//! User service for business logic.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{CreateUserRequest, User};
use super::repository::UserRepository;
use crate::auth::{Role, password};

/// Service for user signup and credential checks.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Register a new user with validation.
    ///
    /// The role comes from the request and defaults to USER. Self-registration
    /// as ADMIN is accepted; see the signup test pinning this behavior.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn signup(&self, request: CreateUserRequest) -> Result<User> {
        if !is_valid_email(&request.email) {
            bail!("Invalid email format.");
        }

        if request.password.len() < 6 {
            bail!("Password must be at least 6 characters.");
        }

        if !self.repo.is_email_available(&request.email).await? {
            bail!("Email '{}' is already registered.", request.email);
        }

        let password_hash = password::hash(&request.password)?;
        let role = request.role.unwrap_or(Role::User);

        let user = self.repo.create(&request.email, &password_hash, role).await?;
        info!(user_id = %user.id, role = %user.role, "Created new user");

        Ok(user)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.repo.get(id).await
    }

    /// Verify user credentials.
    ///
    /// Returns the user on success, None for unknown email or wrong password.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = self.repo.get_by_email(email).await?;

        match user {
            Some(user) if password::verify(password, &user.password_hash) => Ok(Some(user)),
            _ => Ok(None),
        }
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return false;
    }
    !parts[0].is_empty() && parts[1].contains('.')
}

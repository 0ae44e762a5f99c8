//! Password hashing.

use anyhow::{Context, Result};

/// Hash a password using bcrypt.
///
/// The salt is random, so hashing the same input twice yields different
/// digests.
pub fn hash(password: &str) -> Result<String> {
    // Use a lower cost factor for development speed
    let cost = if cfg!(debug_assertions) { 4 } else { 10 };
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a bcrypt hash.
///
/// Returns false on any mismatch, including malformed digests; never errors.
/// The comparison inside bcrypt is constant-time.
pub fn verify(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

//! Ticket repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{Ticket, TicketStatus};

/// Repository for ticket database operations.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: SqlitePool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Generate a new ticket ID.
    fn generate_id() -> String {
        format!("tkt_{}", nanoid::nanoid!(12))
    }

    /// Create a new ticket. New tickets always start OPEN.
    #[instrument(skip(self, title, description))]
    pub async fn create(&self, owner_id: &str, title: &str, description: &str) -> Result<Ticket> {
        let id = Self::generate_id();

        debug!("Creating ticket {} for user {}", id, owner_id);

        sqlx::query(
            r#"
            INSERT INTO tickets (id, title, description, status, user_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(title)
        .bind(description)
        .bind(TicketStatus::Open)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .context("Failed to insert ticket")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Ticket not found after creation"))
    }

    /// Get a ticket by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        let ticket = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tickets
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch ticket")?;

        Ok(ticket)
    }

    /// List all tickets.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tickets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tickets")?;

        Ok(tickets)
    }

    /// List tickets owned by a user.
    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Ticket>> {
        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tickets
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tickets by owner")?;

        Ok(tickets)
    }

    /// Update a ticket's status. Last write wins under concurrency.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: &str, status: TicketStatus) -> Result<Ticket> {
        let result = sqlx::query(
            "UPDATE tickets SET status = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update ticket status")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Ticket not found: {}", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Ticket not found after update"))
    }
}

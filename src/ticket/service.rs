//! Ticket lifecycle rules.

use anyhow::{Result, bail};
use tracing::{info, instrument};

use super::models::{CreateTicketRequest, Ticket, TicketStatus};
use super::repository::TicketRepository;

/// Service for ticket operations.
#[derive(Debug, Clone)]
pub struct TicketService {
    repo: TicketRepository,
}

impl TicketService {
    /// Create a new ticket service.
    pub fn new(repo: TicketRepository) -> Self {
        Self { repo }
    }

    /// Create a ticket for a user. New tickets always start OPEN.
    #[instrument(skip(self, request))]
    pub async fn create_ticket(
        &self,
        owner_id: &str,
        request: CreateTicketRequest,
    ) -> Result<Ticket> {
        if request.title.trim().is_empty() {
            bail!("Title must not be empty.");
        }
        if request.description.trim().is_empty() {
            bail!("Description must not be empty.");
        }

        let ticket = self
            .repo
            .create(owner_id, &request.title, &request.description)
            .await?;
        info!(ticket_id = %ticket.id, owner = %owner_id, "Created ticket");

        Ok(ticket)
    }

    /// List every ticket in the system. Callers gate this to admins.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Ticket>> {
        self.repo.list_all().await
    }

    /// List tickets owned by a user.
    #[instrument(skip(self))]
    pub async fn list_owned(&self, user_id: &str) -> Result<Vec<Ticket>> {
        self.repo.list_by_owner(user_id).await
    }

    /// Set a ticket's status from its wire representation.
    ///
    /// Any recognized status may be set in any order; only membership in the
    /// enum is enforced. The ticket is left unchanged on a bad value.
    #[instrument(skip(self))]
    pub async fn set_status(&self, ticket_id: &str, status: &str) -> Result<Ticket> {
        let Ok(status) = status.parse::<TicketStatus>() else {
            bail!("Invalid status '{}'.", status);
        };

        let ticket = self.repo.update_status(ticket_id, status).await?;
        info!(ticket_id = %ticket.id, status = %ticket.status, "Updated ticket status");

        Ok(ticket)
    }
}

//! Ticket management module.
//!
//! Ticket storage and the lifecycle rules (status membership, ownership
//! visibility).

mod models;
mod repository;
mod service;

pub use models::{CreateTicketRequest, Ticket, TicketStatus};
pub use repository::TicketRepository;
pub use service::TicketService;

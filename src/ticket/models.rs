//! Ticket data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ticket status.
///
/// Any of the three values may be set in any order by an admin; there is no
/// transition-ordering rule, only membership in this enum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Newly created, awaiting triage.
    #[default]
    Open,
    /// Being worked on.
    InProgress,
    /// Resolved.
    Closed,
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketStatus::Open => write!(f, "OPEN"),
            TicketStatus::InProgress => write!(f, "IN_PROGRESS"),
            TicketStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(TicketStatus::Open),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "CLOSED" => Ok(TicketStatus::Closed),
            _ => Err(format!("unknown ticket status: {}", s)),
        }
    }
}

impl TryFrom<String> for TicketStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl sqlx::Type<sqlx::Sqlite> for TicketStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TicketStatus {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Sqlite as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.to_string();
        <String as sqlx::Encode<sqlx::Sqlite>>::encode(s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TicketStatus {
    fn decode(
        value: <sqlx::Sqlite as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

/// Ticket entity from database.
///
/// The owner is fixed at creation and never reassigned; tickets are never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub status: TicketStatus,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Request to create a new ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
}

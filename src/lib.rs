//! Ticketd library.
//!
//! Core components of the support ticket tracker backend: authentication,
//! user and ticket services, and the HTTP API.

pub mod api;
pub mod auth;
pub mod db;
pub mod ticket;
pub mod user;

//! Ticket repository abstraction.
//!
//! This module provides a `TicketRepository` trait for fetching and editing
//! tickets, with an HTTP implementation for the tracker backend.

mod http;
mod types;

pub use http::{attachment_url, HttpTicketRepository};
pub use types::*;

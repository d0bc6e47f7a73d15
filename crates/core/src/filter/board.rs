//! Partition of tickets into status columns.

use serde::Serialize;

use crate::ticket::{Ticket, TicketId, TicketStatus};

/// One board column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub status: TicketStatus,
    pub tickets: Vec<Ticket>,
}

impl Column {
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }
}

/// Tickets grouped into the six fixed status columns.
///
/// The partition is total and disjoint: every ticket is in exactly one
/// column. Columns always exist, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBoard {
    columns: [Column; 6],
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            columns: TicketStatus::ALL.map(|status| Column {
                status,
                tickets: Vec::new(),
            }),
        }
    }
}

impl StatusBoard {
    /// Group tickets by status, keeping input order within each column.
    pub fn partition(tickets: Vec<Ticket>) -> Self {
        let mut board = Self::default();
        for ticket in tickets {
            board.columns[ticket.status.index()].tickets.push(ticket);
        }
        board
    }

    pub fn column(&self, status: TicketStatus) -> &Column {
        &self.columns[status.index()]
    }

    /// Columns in board order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Total number of tickets across all columns.
    pub fn total(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    pub fn find(&self, id: &TicketId) -> Option<&Ticket> {
        self.columns
            .iter()
            .flat_map(|c| c.tickets.iter())
            .find(|t| t.id == *id)
    }

    /// All tickets, column by column.
    pub fn into_tickets(self) -> Vec<Ticket> {
        self.columns
            .into_iter()
            .flat_map(|c| c.tickets.into_iter())
            .collect()
    }
}

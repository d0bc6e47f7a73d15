//! Testing utilities and mock implementations.
//!
//! This module provides an in-memory ticket repository so board loading and
//! CLI commands can be tested without a running backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use kanban_core::testing::{fixtures, MockTicketRepository};
//!
//! let repository = MockTicketRepository::new();
//! repository.set_tickets(fixtures::sample_tickets()).await;
//!
//! let loader = BoardLoader::new(Arc::new(repository.clone()));
//! ```

mod mock_repository;

pub use mock_repository::{MockTicketRepository, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::ticket::{Attachment, Ticket, TicketStatus};

    /// Create a ticket with a summary and a raw backend status.
    pub fn ticket(id: i64, summary: &str, status: &str) -> Ticket {
        let mut ticket = Ticket::new(id, summary);
        ticket.status = TicketStatus::normalize(status);
        ticket
    }

    /// Create a fully classified ticket.
    pub fn classified_ticket(
        id: i64,
        summary: &str,
        work_type: &str,
        game_name: &str,
        team: &str,
    ) -> Ticket {
        let mut ticket = Ticket::new(id, summary);
        ticket.work_type = work_type.to_string();
        ticket.game_name = game_name.to_string();
        ticket.team = team.to_string();
        ticket.project = "Alpha".to_string();
        ticket
    }

    /// Create a ticket carrying the given attachment filenames.
    pub fn ticket_with_attachments(id: i64, summary: &str, filenames: &[&str]) -> Ticket {
        let mut ticket = Ticket::new(id, summary);
        ticket.attachments = filenames
            .iter()
            .enumerate()
            .map(|(i, name)| Attachment::new(id * 100 + i as i64, *name))
            .collect();
        ticket
    }

    /// A small board spanning two games, two teams and several statuses.
    pub fn sample_tickets() -> Vec<Ticket> {
        let mut tickets = vec![
            classified_ticket(1, "Fix login bug", "Bug", "Space Game", "Core"),
            classified_ticket(2, "Add leaderboard", "Feature", "Space Game", "UI"),
            classified_ticket(3, "Login screen redesign", "Feature", "Racer", "UI"),
            classified_ticket(4, "Crash on track load", "Bug", "Racer", "Core"),
            classified_ticket(5, "Tune physics", "Task", "Racer", "Core"),
        ];
        tickets[1].status = TicketStatus::InProcess;
        tickets[2].status = TicketStatus::InReview;
        tickets[3].status = TicketStatus::Done;
        tickets[4].status = TicketStatus::OnHold;
        tickets[0].assignee = "42".to_string();
        tickets
    }
}

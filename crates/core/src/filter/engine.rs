//! Client-side ticket filtering.

use crate::ticket::Ticket;

use super::FilterCriteria;

/// Predicates compiled from a `FilterCriteria`.
///
/// A ticket is kept iff every active predicate matches. Filtering is a
/// single stable pass: relative order of kept tickets is preserved.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    work_type: Option<String>,
    game_name: Option<String>,
    team: Option<String>,
    /// Lower-cased search needle.
    needle: Option<String>,
}

impl FilterEngine {
    pub fn new(criteria: &FilterCriteria) -> Self {
        Self {
            work_type: criteria.work_type().map(str::to_string),
            game_name: criteria.game_name().map(str::to_string),
            team: criteria.team().map(str::to_string),
            needle: criteria.search_text().map(str::to_lowercase),
        }
    }

    /// True when no predicate is active and `apply` returns its input.
    pub fn is_identity(&self) -> bool {
        self.work_type.is_none()
            && self.game_name.is_none()
            && self.team.is_none()
            && self.needle.is_none()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(work_type) = &self.work_type {
            if ticket.work_type != *work_type {
                return false;
            }
        }
        if let Some(game_name) = &self.game_name {
            if ticket.game_name != *game_name {
                return false;
            }
        }
        if let Some(team) = &self.team {
            if ticket.team != *team {
                return false;
            }
        }
        if let Some(needle) = &self.needle {
            if !ticket.summary.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, tickets: Vec<Ticket>) -> Vec<Ticket> {
        if self.is_identity() {
            return tickets;
        }
        tickets.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Filter `tickets` by `criteria`.
pub fn apply(tickets: Vec<Ticket>, criteria: &FilterCriteria) -> Vec<Ticket> {
    FilterEngine::new(criteria).apply(tickets)
}

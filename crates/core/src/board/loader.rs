//! Fetch-filter-partition pipeline behind every board refresh.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::filter::{FilterCriteria, FilterEngine, StatusBoard};
use crate::metrics;
use crate::repository::{RepositoryError, TicketRepository};

use super::RequestSequencer;

/// A rendered-ready board produced by the latest load.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    /// Sequence number of the load that produced this view.
    pub seq: u64,
    /// Criteria actually applied, including any fixed game scope.
    pub criteria: FilterCriteria,
    /// Number of tickets the backend returned before client-side filtering.
    pub fetched: usize,
    pub board: StatusBoard,
}

/// Result of a board load.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// This load is the most recent one; render it.
    Fresh(BoardView),
    /// A newer load was issued while this one was in flight; drop it.
    Stale { seq: u64 },
}

impl LoadOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, LoadOutcome::Stale { .. })
    }

    pub fn into_fresh(self) -> Option<BoardView> {
        match self {
            LoadOutcome::Fresh(view) => Some(view),
            LoadOutcome::Stale { .. } => None,
        }
    }
}

/// Loads boards from a repository, keeping only the newest response.
///
/// Loads may overlap and finish in any order. Each is tagged with a sequence
/// number on issue; when it completes after a newer load was issued, its
/// result (tickets or error) is discarded.
pub struct BoardLoader {
    repository: Arc<dyn TicketRepository>,
    sequencer: RequestSequencer,
    fixed_game_name: Option<String>,
}

impl BoardLoader {
    pub fn new(repository: Arc<dyn TicketRepository>) -> Self {
        Self {
            repository,
            sequencer: RequestSequencer::new(),
            fixed_game_name: None,
        }
    }

    /// Scope every load to one game, overriding the requested game filter.
    pub fn with_fixed_game_name(mut self, game_name: Option<String>) -> Self {
        self.fixed_game_name = game_name.filter(|g| !g.trim().is_empty());
        self
    }

    pub fn fixed_game_name(&self) -> Option<&str> {
        self.fixed_game_name.as_deref()
    }

    /// Criteria with the fixed game scope applied.
    pub fn effective_criteria(&self, criteria: &FilterCriteria) -> FilterCriteria {
        let mut effective = criteria.clone();
        if let Some(game) = &self.fixed_game_name {
            effective.game_name = Some(game.clone());
        }
        effective
    }

    pub async fn load(&self, criteria: &FilterCriteria) -> Result<LoadOutcome, RepositoryError> {
        let seq = self.sequencer.issue();
        let criteria = self.effective_criteria(criteria);
        debug!(seq = seq, repository = self.repository.name(), "Loading board");

        let result = self.repository.fetch_tickets(&criteria).await;

        if !self.sequencer.is_latest(seq) {
            debug!(
                seq = seq,
                latest = self.sequencer.latest(),
                "Discarding stale board response"
            );
            metrics::STALE_RESPONSES_DISCARDED.inc();
            metrics::BOARD_LOADS.with_label_values(&["stale"]).inc();
            return Ok(LoadOutcome::Stale { seq });
        }

        let tickets = result.inspect_err(|_| {
            metrics::BOARD_LOADS.with_label_values(&["error"]).inc();
        })?;

        let fetched = tickets.len();
        let filtered = FilterEngine::new(&criteria).apply(tickets);
        let board = StatusBoard::partition(filtered);
        debug!(
            seq = seq,
            fetched = fetched,
            shown = board.total(),
            "Board loaded"
        );
        metrics::BOARD_LOADS.with_label_values(&["fresh"]).inc();

        Ok(LoadOutcome::Fresh(BoardView {
            seq,
            criteria,
            fetched,
            board,
        }))
    }
}

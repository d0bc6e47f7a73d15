//! Filter criteria selected by the user.

use serde::{Deserialize, Serialize};

/// Active filter predicates. Absent or empty fields place no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Free-text search over ticket summaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work_type(mut self, work_type: impl Into<String>) -> Self {
        self.work_type = Some(work_type.into());
        self
    }

    pub fn with_game_name(mut self, game_name: impl Into<String>) -> Self {
        self.game_name = Some(game_name.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_search_text(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = Some(search_text.into());
        self
    }

    /// Work type constraint, if active.
    pub fn work_type(&self) -> Option<&str> {
        active(&self.work_type)
    }

    /// Game name constraint, if active.
    pub fn game_name(&self) -> Option<&str> {
        active(&self.game_name)
    }

    /// Team constraint, if active.
    pub fn team(&self) -> Option<&str> {
        active(&self.team)
    }

    /// Trimmed search text, if any remains after trimming.
    pub fn search_text(&self) -> Option<&str> {
        self.search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.work_type().is_none()
            && self.game_name().is_none()
            && self.team().is_none()
            && self.search_text().is_none()
    }

    /// Active predicates as backend query parameters.
    pub fn query_params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(v) = self.work_type() {
            params.push(("workType", v));
        }
        if let Some(v) = self.game_name() {
            params.push(("gameName", v));
        }
        if let Some(v) = self.team() {
            params.push(("team", v));
        }
        if let Some(v) = self.search_text() {
            params.push(("search", v));
        }
        params
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

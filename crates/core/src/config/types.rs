use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub board: BoardConfig,
    /// Known users, used to resolve assignee ids to display names.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

/// Ticket backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend base URL (e.g., "http://127.0.0.1:5000")
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl BackendConfig {
    /// Create a backend config with the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

/// Board presentation configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoardConfig {
    /// When set, the board is scoped to a single game: every load filters
    /// by it and new tickets are created under it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_game_name: Option<String>,
}

/// A user entry for assignee display-name lookup
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

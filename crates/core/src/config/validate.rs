use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Backend section exists (enforced by serde)
/// - Backend URL is http(s) and timeout is not 0
/// - Fixed game name, when set, is not blank
/// - User ids are non-empty and unique
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let url = config.backend.url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backend.url must start with http:// or https://, got {:?}",
            config.backend.url
        )));
    }

    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.timeout_secs cannot be 0".to_string(),
        ));
    }

    if let Some(game) = &config.board.fixed_game_name {
        if game.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "board.fixed_game_name cannot be blank".to_string(),
            ));
        }
    }

    let mut seen = HashSet::new();
    for user in &config.users {
        if user.id.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "user {:?} has an empty id",
                user.name
            )));
        }
        if !seen.insert(user.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate user id: {}",
                user.id
            )));
        }
    }

    Ok(())
}

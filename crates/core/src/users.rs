//! Assignee display-name lookup.
//!
//! Tickets store the assignee as a user id; names are resolved only when a
//! ticket is rendered.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::UserConfig;
use crate::ticket::Ticket;

/// Label shown for tickets without an assignee.
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// A known user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }
}

impl From<&UserConfig> for User {
    fn from(config: &UserConfig) -> Self {
        Self {
            id: config.id.clone(),
            name: config.name.clone(),
            email: config.email.clone(),
        }
    }
}

/// Lookup collaborator resolving user ids.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn resolve(&self, id: &str) -> Option<User>;
}

/// In-memory directory built from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    users: HashMap<String, User>,
}

impl StaticUserDirectory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn from_config(users: &[UserConfig]) -> Self {
        Self::new(users.iter().map(User::from))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn resolve(&self, id: &str) -> Option<User> {
        self.users.get(id).cloned()
    }
}

/// Display label for a ticket's assignee.
///
/// Unknown ids are shown as-is; an empty assignee is "Unassigned".
pub async fn assignee_label(ticket: &Ticket, directory: &dyn UserDirectory) -> String {
    let id = ticket.assignee.trim();
    if id.is_empty() {
        return UNASSIGNED_LABEL.to_string();
    }
    match directory.resolve(id).await {
        Some(user) => user.name,
        None => id.to_string(),
    }
}

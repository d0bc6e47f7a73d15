//! Payload types for creating and updating tickets.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Ticket, TicketStatus};

/// Editable ticket fields. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Assignee user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_name: Option<String>,
}

impl TicketFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every field of an existing ticket, for a complete update.
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            summary: Some(ticket.summary.clone()),
            project: Some(ticket.project.clone()),
            work_type: Some(ticket.work_type.clone()),
            status: Some(ticket.status),
            description: Some(ticket.description.clone()),
            assignee: Some(ticket.assignee.clone()),
            team: Some(ticket.team.clone()),
            game_name: Some(ticket.game_name.clone()),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_work_type(mut self, work_type: impl Into<String>) -> Self {
        self.work_type = Some(work_type.into());
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_game_name(mut self, game_name: impl Into<String>) -> Self {
        self.game_name = Some(game_name.into());
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.project.is_none()
            && self.work_type.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.assignee.is_none()
            && self.team.is_none()
            && self.game_name.is_none()
    }

    /// Overlay the fields set in `changes` onto `self`.
    pub fn merge(mut self, changes: TicketFields) -> Self {
        if changes.summary.is_some() {
            self.summary = changes.summary;
        }
        if changes.project.is_some() {
            self.project = changes.project;
        }
        if changes.work_type.is_some() {
            self.work_type = changes.work_type;
        }
        if changes.status.is_some() {
            self.status = changes.status;
        }
        if changes.description.is_some() {
            self.description = changes.description;
        }
        if changes.assignee.is_some() {
            self.assignee = changes.assignee;
        }
        if changes.team.is_some() {
            self.team = changes.team;
        }
        if changes.game_name.is_some() {
            self.game_name = changes.game_name;
        }
        self
    }

    /// Name of the first required field missing for ticket creation.
    pub fn missing_for_create(&self) -> Option<&'static str> {
        match self.game_name.as_deref().map(str::trim) {
            None | Some("") => Some("gameName"),
            _ => None,
        }
    }

    /// Multipart text fields for ticket submission.
    ///
    /// The submit endpoint reads every field unconditionally, so unset
    /// fields are sent as empty strings and the status defaults to `To Do`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            ("summary", text(&self.summary)),
            ("project", text(&self.project)),
            ("workType", text(&self.work_type)),
            (
                "status",
                self.status.unwrap_or_default().label().to_string(),
            ),
            ("description", text(&self.description)),
            ("assignee", text(&self.assignee)),
            ("team", text(&self.team)),
            ("gameName", text(&self.game_name)),
        ]
    }
}

/// A file to upload as a ticket attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = guess_content_type(&filename).map(str::to_string);
        Self {
            filename,
            content_type,
            data,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        Ok(Self::new(filename, data))
    }
}

/// Downloaded attachment bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentContent {
    /// Filename from the `Content-Disposition` header, when present.
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

fn guess_content_type(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    Some(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "txt" | "log" => "text/plain",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    })
}

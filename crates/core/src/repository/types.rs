//! Types for ticket repository operations.

use async_trait::async_trait;
use thiserror::Error;

use crate::filter::FilterCriteria;
use crate::ticket::{AttachmentContent, AttachmentId, FileUpload, Ticket, TicketFields, TicketId};

/// Errors that can occur during repository operations.
///
/// None of these are retried automatically and none are fatal: the caller
/// shows a message and the next user action may try again.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Transport failure or timeout; no response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend reported the requested resource as absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was rejected for invalid or missing fields.
    #[error("Validation failed: {message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// A successful response lacked the structured body the operation needs.
    #[error("Missing response body for {operation}")]
    MissingBody { operation: &'static str },

    /// Reading a local file for upload failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl RepositoryError {
    /// Validation error for a named field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        RepositoryError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status with its extracted message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => RepositoryError::NotFound(message),
            400 | 422 => RepositoryError::Validation {
                field: None,
                message,
            },
            _ => RepositoryError::Backend { status, message },
        }
    }

    /// Short machine-friendly kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RepositoryError::Network(_) => "network",
            RepositoryError::Backend { .. } => "backend",
            RepositoryError::NotFound(_) => "not_found",
            RepositoryError::Validation { .. } => "validation",
            RepositoryError::MissingBody { .. } => "missing_body",
            RepositoryError::Io(_) => "io",
        }
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(e: std::io::Error) -> Self {
        RepositoryError::Io(e.to_string())
    }
}

/// Access to the ticket backend.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Returns the repository name for logging.
    fn name(&self) -> &str;

    /// Fetch tickets, passing active criteria to the backend as parameters.
    async fn fetch_tickets(&self, criteria: &FilterCriteria)
        -> Result<Vec<Ticket>, RepositoryError>;

    /// Fetch one ticket with its attachments.
    async fn fetch_ticket_by_id(&self, id: &TicketId) -> Result<Ticket, RepositoryError>;

    /// Create a ticket with zero or more attachments.
    async fn create_ticket(
        &self,
        fields: &TicketFields,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError>;

    /// Update a ticket and return its new state.
    async fn update_ticket(
        &self,
        id: &TicketId,
        fields: &TicketFields,
    ) -> Result<Ticket, RepositoryError>;

    /// Remove one attachment.
    async fn delete_attachment(&self, attachment_id: &AttachmentId)
        -> Result<(), RepositoryError>;

    /// Append attachments to an existing ticket.
    async fn add_attachments(
        &self,
        ticket_id: &TicketId,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError>;

    /// Download attachment bytes.
    async fn fetch_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<AttachmentContent, RepositoryError>;

    /// Known game names, for filter and create-form choices.
    async fn fetch_game_names(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Checks shared by every repository implementation, run before any I/O.
pub fn validate_create(fields: &TicketFields) -> Result<(), RepositoryError> {
    match fields.missing_for_create() {
        Some(field) => Err(RepositoryError::invalid_field(
            field,
            format!("{} is required", field),
        )),
        None => Ok(()),
    }
}

/// Upload batches must contain at least one file.
pub fn validate_uploads(files: &[FileUpload]) -> Result<(), RepositoryError> {
    if files.is_empty() {
        return Err(RepositoryError::invalid_field(
            "attachments",
            "No files uploaded",
        ));
    }
    Ok(())
}

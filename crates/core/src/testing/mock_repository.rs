//! Mock ticket repository for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::filter::FilterCriteria;
use crate::repository::{validate_create, validate_uploads, RepositoryError, TicketRepository};
use crate::ticket::{
    Attachment, AttachmentContent, AttachmentId, FileUpload, Ticket, TicketFields, TicketId,
};

/// A recorded repository call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    FetchTickets(FilterCriteria),
    FetchTicket(TicketId),
    Create {
        fields: TicketFields,
        filenames: Vec<String>,
    },
    Update {
        id: TicketId,
        fields: TicketFields,
    },
    DeleteAttachment(AttachmentId),
    AddAttachments {
        ticket_id: TicketId,
        filenames: Vec<String>,
    },
    FetchAttachment(AttachmentId),
    FetchGameNames,
}

/// In-memory implementation of the TicketRepository trait.
///
/// Like the real backend, `fetch_tickets` ignores the criteria and returns
/// every stored ticket, so callers must filter client-side.
///
/// Provides controllable behavior for testing:
/// - Seed the stored tickets
/// - Delay individual fetches to force out-of-order completion
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// let repo = MockTicketRepository::new();
/// repo.set_tickets(vec![fixtures::ticket(1, "Login page", "To Do")]).await;
///
/// // Make the next fetch slow
/// repo.push_fetch_delay(Duration::from_millis(100)).await;
///
/// let tickets = repo.fetch_tickets(&FilterCriteria::new()).await?;
/// assert_eq!(repo.calls().await.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockTicketRepository {
    /// Stored tickets in backend order.
    tickets: Arc<RwLock<Vec<Ticket>>>,
    /// Attachment bytes by attachment id.
    contents: Arc<RwLock<HashMap<AttachmentId, AttachmentContent>>>,
    /// Recorded calls in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Delays applied to successive fetch_tickets calls.
    fetch_delays: Arc<RwLock<VecDeque<Duration>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<RepositoryError>>>,
    /// Counter for generating ticket and attachment ids.
    id_counter: Arc<RwLock<i64>>,
    game_names: Arc<RwLock<Vec<String>>>,
}

impl Default for MockTicketRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketRepository {
    /// Create an empty mock repository.
    pub fn new() -> Self {
        Self {
            tickets: Arc::new(RwLock::new(Vec::new())),
            contents: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            fetch_delays: Arc::new(RwLock::new(VecDeque::new())),
            next_error: Arc::new(RwLock::new(None)),
            id_counter: Arc::new(RwLock::new(1000)),
            game_names: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace the stored tickets.
    pub async fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.write().await = tickets;
    }

    /// Current stored tickets.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }

    pub async fn set_game_names(&self, names: Vec<String>) {
        *self.game_names.write().await = names;
    }

    /// Store downloadable bytes for an attachment id.
    pub async fn set_attachment_content(&self, id: impl Into<AttachmentId>, content: AttachmentContent) {
        self.contents.write().await.insert(id.into(), content);
    }

    /// Delay the next not-yet-delayed fetch_tickets call.
    pub async fn push_fetch_delay(&self, delay: Duration) {
        self.fetch_delays.write().await.push_back(delay);
    }

    /// Set an error to be returned on the next operation.
    pub async fn set_next_error(&self, error: RepositoryError) {
        *self.next_error.write().await = Some(error);
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Criteria passed to each fetch_tickets call.
    pub async fn fetch_criteria(&self) -> Vec<FilterCriteria> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|call| match call {
                RecordedCall::FetchTickets(criteria) => Some(criteria.clone()),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    async fn record(&self, call: RecordedCall) {
        self.calls.write().await.push(call);
    }

    async fn check_error(&self) -> Result<(), RepositoryError> {
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn next_id(&self) -> i64 {
        let mut counter = self.id_counter.write().await;
        *counter += 1;
        *counter
    }

    async fn find(&self, id: &TicketId) -> Result<Ticket, RepositoryError> {
        self.tickets
            .read()
            .await
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("Ticket {} not found", id)))
    }

    async fn store_uploads(&self, files: Vec<FileUpload>) -> Vec<Attachment> {
        let mut attachments = Vec::with_capacity(files.len());
        for file in files {
            let id = AttachmentId::from(self.next_id().await);
            self.contents.write().await.insert(
                id.clone(),
                AttachmentContent {
                    filename: Some(file.filename.clone()),
                    content_type: file.content_type,
                    data: file.data,
                },
            );
            attachments.push(Attachment::new(id, file.filename));
        }
        attachments
    }
}

/// Write every set field onto the ticket.
fn apply_fields(ticket: &mut Ticket, fields: &TicketFields) {
    let set = |target: &mut String, value: &Option<String>| {
        if let Some(value) = value {
            *target = value.clone();
        }
    };
    set(&mut ticket.summary, &fields.summary);
    set(&mut ticket.project, &fields.project);
    set(&mut ticket.work_type, &fields.work_type);
    set(&mut ticket.description, &fields.description);
    set(&mut ticket.assignee, &fields.assignee);
    set(&mut ticket.team, &fields.team);
    set(&mut ticket.game_name, &fields.game_name);
    if let Some(status) = fields.status {
        ticket.status = status;
    }
}

#[async_trait]
impl TicketRepository for MockTicketRepository {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_tickets(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Ticket>, RepositoryError> {
        self.record(RecordedCall::FetchTickets(criteria.clone())).await;
        let delay = self.fetch_delays.write().await.pop_front();
        let result = self.check_error().await;
        if let Some(delay) = delay.filter(|d| !d.is_zero()) {
            tokio::time::sleep(delay).await;
        }
        result?;
        Ok(self.tickets.read().await.clone())
    }

    async fn fetch_ticket_by_id(&self, id: &TicketId) -> Result<Ticket, RepositoryError> {
        self.record(RecordedCall::FetchTicket(id.clone())).await;
        self.check_error().await?;
        self.find(id).await
    }

    async fn create_ticket(
        &self,
        fields: &TicketFields,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError> {
        self.record(RecordedCall::Create {
            fields: fields.clone(),
            filenames: files.iter().map(|f| f.filename.clone()).collect(),
        })
        .await;
        validate_create(fields)?;
        self.check_error().await?;

        let mut ticket = Ticket::new(self.next_id().await, "");
        apply_fields(&mut ticket, fields);
        ticket.created_at = Some(Utc::now());
        ticket.attachments = self.store_uploads(files).await;

        self.tickets.write().await.push(ticket.clone());
        Ok(ticket)
    }

    async fn update_ticket(
        &self,
        id: &TicketId,
        fields: &TicketFields,
    ) -> Result<Ticket, RepositoryError> {
        self.record(RecordedCall::Update {
            id: id.clone(),
            fields: fields.clone(),
        })
        .await;
        self.check_error().await?;

        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Ticket {} not found", id)))?;
        apply_fields(ticket, fields);
        Ok(ticket.clone())
    }

    async fn delete_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<(), RepositoryError> {
        self.record(RecordedCall::DeleteAttachment(attachment_id.clone()))
            .await;
        self.check_error().await?;

        let mut removed = false;
        for ticket in self.tickets.write().await.iter_mut() {
            let before = ticket.attachments.len();
            ticket.attachments.retain(|a| &a.id != attachment_id);
            removed |= ticket.attachments.len() != before;
        }
        self.contents.write().await.remove(attachment_id);

        if removed {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!(
                "Attachment {} not found",
                attachment_id
            )))
        }
    }

    async fn add_attachments(
        &self,
        ticket_id: &TicketId,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError> {
        self.record(RecordedCall::AddAttachments {
            ticket_id: ticket_id.clone(),
            filenames: files.iter().map(|f| f.filename.clone()).collect(),
        })
        .await;
        validate_uploads(&files)?;
        self.check_error().await?;
        self.find(ticket_id).await?;

        let attachments = self.store_uploads(files).await;
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| &t.id == ticket_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("Ticket {} not found", ticket_id)))?;
        ticket.attachments.extend(attachments);
        Ok(ticket.clone())
    }

    async fn fetch_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<AttachmentContent, RepositoryError> {
        self.record(RecordedCall::FetchAttachment(attachment_id.clone()))
            .await;
        self.check_error().await?;
        self.contents
            .read()
            .await
            .get(attachment_id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("Attachment {} not found", attachment_id))
            })
    }

    async fn fetch_game_names(&self) -> Result<Vec<String>, RepositoryError> {
        self.record(RecordedCall::FetchGameNames).await;
        self.check_error().await?;
        Ok(self.game_names.read().await.clone())
    }
}

//! HTTP ticket repository implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::filter::FilterCriteria;
use crate::metrics;
use crate::ticket::{
    AttachmentContent, AttachmentId, FileUpload, Ticket, TicketFields, TicketId,
};

use super::{validate_create, validate_uploads, RepositoryError, TicketRepository};

/// Longest plain-text error body surfaced to the caller.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Ticket repository backed by the tracker's HTTP API.
pub struct HttpTicketRepository {
    client: Client,
    config: BackendConfig,
}

impl HttpTicketRepository {
    /// Create a new repository client.
    pub fn new(config: BackendConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(concat!("kanban/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url(), endpoint)
    }

    /// URL serving an attachment's content.
    pub fn attachment_url(&self, attachment_id: &AttachmentId) -> String {
        attachment_url(&self.config.url, attachment_id)
    }

    /// Send a request, mapping transport failures and non-success statuses.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, RepositoryError> {
        let start = Instant::now();
        let result = execute(request).await;
        record_outcome(operation, start, &result);
        result
    }

    /// Fetch a single ticket, failing if the body is not a ticket.
    async fn get_ticket(&self, id: &TicketId) -> Result<Ticket, RepositoryError> {
        let url = self.url(&format!("/get_ticket/{}", urlencoding::encode(id.as_str())));
        debug!(ticket_id = %id, "Fetching ticket");

        let response = self.send("fetch_ticket_by_id", self.client.get(&url)).await?;
        safe_json::<Ticket>(response)
            .await
            .ok_or(RepositoryError::MissingBody {
                operation: "fetch_ticket_by_id",
            })
    }
}

/// URL serving an attachment's content from the backend at `base_url`.
pub fn attachment_url(base_url: &str, attachment_id: &AttachmentId) -> String {
    format!(
        "{}/attachment/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(attachment_id.as_str())
    )
}

/// Build the ticket list endpoint with active criteria as query parameters.
fn tickets_endpoint(criteria: &FilterCriteria) -> String {
    let mut endpoint = "/get_tickets".to_string();
    let query_parts: Vec<String> = criteria
        .query_params()
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if !query_parts.is_empty() {
        endpoint.push('?');
        endpoint.push_str(&query_parts.join("&"));
    }
    endpoint
}

async fn execute(request: RequestBuilder) -> Result<Response, RepositoryError> {
    match request.send().await {
        Ok(response) if response.status().is_success() => Ok(response),
        Ok(response) => Err(error_from_response(response).await),
        Err(e) => Err(map_transport_error(e)),
    }
}

/// Count a finished backend operation, warning on failure.
fn record_outcome<T>(operation: &'static str, start: Instant, result: &Result<T, RepositoryError>) {
    let label = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::record_backend_request(operation, label, start.elapsed());

    if let Err(e) = result {
        warn!(operation = operation, error = %e, "Backend request failed");
    }
}

/// Read a downloaded attachment's headers and body.
async fn read_attachment(response: Response) -> Result<AttachmentContent, RepositoryError> {
    let header = |name: HeaderName| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header(CONTENT_TYPE);
    let filename = header(CONTENT_DISPOSITION)
        .as_deref()
        .and_then(parse_content_disposition);

    let data = response.bytes().await.map_err(map_transport_error)?;
    Ok(AttachmentContent {
        filename,
        content_type,
        data: data.to_vec(),
    })
}

fn map_transport_error(e: reqwest::Error) -> RepositoryError {
    if e.is_timeout() {
        RepositoryError::Network("Request timed out".to_string())
    } else if e.is_connect() {
        RepositoryError::Network(format!("Connection failed: {}", e))
    } else {
        RepositoryError::Network(e.to_string())
    }
}

async fn error_from_response(response: Response) -> RepositoryError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    RepositoryError::from_status(status.as_u16(), extract_error_message(status, &body))
}

/// Pick the most useful message out of an error response.
///
/// Order: JSON `error` field, JSON `message` field, short plain-text body,
/// canonical status text.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            match value.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                Some(Value::Null) | None => {}
                Some(Value::String(_)) => {}
                Some(other) => return other.to_string(),
            }
        }
    } else {
        let text = body.trim();
        if !text.is_empty() && !text.starts_with('<') {
            return text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        }
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

/// Decode a JSON body, yielding `None` instead of an error.
async fn safe_json<T: DeserializeOwned>(response: Response) -> Option<T> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Decode a ticket list, skipping entries that are not tickets.
fn decode_ticket_list(value: Value) -> Vec<Ticket> {
    let Value::Array(items) = value else {
        warn!("Ticket list response is not an array");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Ticket>(item) {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable ticket");
                None
            }
        })
        .collect()
}

/// Reject a 2xx body that explicitly reports `success: false`.
fn check_success_flag(status: StatusCode, body: &Value) -> Result<(), RepositoryError> {
    if body.get("success") == Some(&Value::Bool(false)) {
        let message = body
            .get("error")
            .or_else(|| body.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Request was not successful")
            .to_string();
        return Err(RepositoryError::Backend {
            status: status.as_u16(),
            message,
        });
    }
    Ok(())
}

/// Fill fields the create response omits with what was submitted.
fn backfill_created(mut ticket: Ticket, fields: &TicketFields) -> Ticket {
    fn fill(target: &mut String, submitted: &Option<String>) {
        if target.is_empty() {
            if let Some(value) = submitted {
                target.clone_from(value);
            }
        }
    }

    fill(&mut ticket.summary, &fields.summary);
    fill(&mut ticket.project, &fields.project);
    fill(&mut ticket.work_type, &fields.work_type);
    fill(&mut ticket.description, &fields.description);
    fill(&mut ticket.assignee, &fields.assignee);
    fill(&mut ticket.team, &fields.team);
    fill(&mut ticket.game_name, &fields.game_name);
    ticket
}

fn file_part(file: FileUpload) -> Result<multipart::Part, RepositoryError> {
    let content_type = file
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    multipart::Part::bytes(file.data)
        .file_name(file.filename)
        .mime_str(&content_type)
        .map_err(|e| RepositoryError::invalid_field("attachments", e.to_string()))
}

/// Extract the filename from a `Content-Disposition` header value.
fn parse_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for param in header.split(';').map(str::trim) {
        if let Some(value) = param.strip_prefix("filename*=") {
            // RFC 5987: charset'lang'percent-encoded
            let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return Some(decoded.into_owned());
            }
        } else if let Some(value) = param.strip_prefix("filename=") {
            plain = Some(value.trim_matches('"').to_string());
        }
    }
    plain.filter(|name| !name.is_empty())
}

#[async_trait]
impl TicketRepository for HttpTicketRepository {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_tickets(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Ticket>, RepositoryError> {
        let url = self.url(&tickets_endpoint(criteria));
        debug!(url = %url, "Fetching tickets");

        let response = self.send("fetch_tickets", self.client.get(&url)).await?;
        let tickets = match safe_json::<Value>(response).await {
            Some(value) => decode_ticket_list(value),
            None => {
                warn!("Ticket list response was not JSON, treating as empty");
                Vec::new()
            }
        };

        metrics::TICKETS_FETCHED
            .with_label_values(&[])
            .observe(tickets.len() as f64);
        debug!(count = tickets.len(), "Tickets fetched");
        Ok(tickets)
    }

    async fn fetch_ticket_by_id(&self, id: &TicketId) -> Result<Ticket, RepositoryError> {
        self.get_ticket(id).await
    }

    async fn create_ticket(
        &self,
        fields: &TicketFields,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError> {
        validate_create(fields)?;

        let mut form = multipart::Form::new();
        for (name, value) in fields.form_fields() {
            form = form.text(name, value);
        }
        let file_count = files.len();
        for file in files {
            form = form.part("attachment", file_part(file)?);
        }

        debug!(attachments = file_count, "Submitting ticket");
        let response = self
            .send(
                "create_ticket",
                self.client.post(self.url("/submit_ticket")).multipart(form),
            )
            .await?;
        let status = response.status();

        let body = safe_json::<Value>(response)
            .await
            .ok_or(RepositoryError::MissingBody {
                operation: "create_ticket",
            })?;
        check_success_flag(status, &body)?;

        let ticket_value = match body.get("ticket") {
            Some(ticket) => ticket.clone(),
            None => body,
        };
        let ticket = serde_json::from_value::<Ticket>(ticket_value).map_err(|e| {
            warn!(error = %e, "Create response did not contain a ticket");
            RepositoryError::MissingBody {
                operation: "create_ticket",
            }
        })?;

        debug!(ticket_id = %ticket.id, "Ticket created");
        Ok(backfill_created(ticket, fields))
    }

    async fn update_ticket(
        &self,
        id: &TicketId,
        fields: &TicketFields,
    ) -> Result<Ticket, RepositoryError> {
        let mut payload = serde_json::to_value(fields)
            .map_err(|e| RepositoryError::invalid_field("fields", e.to_string()))?;
        if let Value::Object(map) = &mut payload {
            map.insert(
                "id".to_string(),
                serde_json::to_value(id).unwrap_or(Value::Null),
            );
        }

        let url = self.url(&format!(
            "/update_ticket/{}",
            urlencoding::encode(id.as_str())
        ));
        debug!(ticket_id = %id, "Updating ticket");

        let response = self
            .send("update_ticket", self.client.post(&url).json(&payload))
            .await?;
        let status = response.status();

        if let Some(body) = safe_json::<Value>(response).await {
            check_success_flag(status, &body)?;
            if body.get("id").is_some() {
                if let Ok(ticket) = serde_json::from_value::<Ticket>(body) {
                    return Ok(ticket);
                }
            }
        }

        // The backend acknowledged without echoing the ticket.
        self.get_ticket(id).await
    }

    async fn delete_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<(), RepositoryError> {
        let url = self.url(&format!(
            "/delete_attachment/{}",
            urlencoding::encode(attachment_id.as_str())
        ));
        debug!(attachment_id = %attachment_id, "Deleting attachment");

        self.send("delete_attachment", self.client.delete(&url))
            .await?;
        Ok(())
    }

    async fn add_attachments(
        &self,
        ticket_id: &TicketId,
        files: Vec<FileUpload>,
    ) -> Result<Ticket, RepositoryError> {
        validate_uploads(&files)?;

        let mut form = multipart::Form::new();
        let file_count = files.len();
        for file in files {
            form = form.part("attachments", file_part(file)?);
        }

        let url = self.url(&format!(
            "/upload_attachment/{}",
            urlencoding::encode(ticket_id.as_str())
        ));
        debug!(ticket_id = %ticket_id, attachments = file_count, "Uploading attachments");

        self.send("add_attachments", self.client.post(&url).multipart(form))
            .await?;
        self.get_ticket(ticket_id).await
    }

    async fn fetch_attachment(
        &self,
        attachment_id: &AttachmentId,
    ) -> Result<AttachmentContent, RepositoryError> {
        let url = self.attachment_url(attachment_id);
        debug!(attachment_id = %attachment_id, "Downloading attachment");

        // Counted after the body is read.
        let start = Instant::now();
        let result = match execute(self.client.get(&url)).await {
            Ok(response) => read_attachment(response).await,
            Err(e) => Err(e),
        };
        record_outcome("fetch_attachment", start, &result);
        result
    }

    async fn fetch_game_names(&self) -> Result<Vec<String>, RepositoryError> {
        let response = self
            .send("fetch_game_names", self.client.get(self.url("/get_game_names")))
            .await?;

        Ok(safe_json::<Vec<String>>(response).await.unwrap_or_else(|| {
            warn!("Game name response was not a JSON string array, treating as empty");
            Vec::new()
        }))
    }
}

//! In-process fake of the ticket backend for HTTP repository tests.
//!
//! The fake mimics the real backend's quirks: the list endpoint ignores its
//! query parameters, create answers `{success, ticket}` with a partial
//! ticket, and update only acknowledges.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kanban_core::{BackendConfig, HttpTicketRepository};

/// Re-export fixtures for test convenience
pub use kanban_core::testing::fixtures;

/// A file received by the fake backend.
#[derive(Debug, Clone)]
pub struct ReceivedFile {
    pub field: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// Stored attachment bytes.
#[derive(Debug, Clone)]
struct StoredAttachment {
    ticket_id: i64,
    filename: String,
    data: Vec<u8>,
}

/// Mutable backend state shared with the test body.
#[derive(Debug, Default)]
pub struct BackendState {
    /// Tickets as JSON objects, in insertion order.
    tickets: Vec<Value>,
    attachments: HashMap<i64, StoredAttachment>,
    next_id: i64,
    game_names: Vec<String>,
    /// Query strings received by the list endpoint.
    pub list_queries: Vec<HashMap<String, String>>,
    /// Text fields of the last multipart submission.
    pub last_form: HashMap<String, String>,
    /// Files of the last multipart submission.
    pub last_files: Vec<ReceivedFile>,
    /// Body of the last update request.
    pub last_update: Option<Value>,
}

impl BackendState {
    fn take_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn find_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.tickets.iter_mut().find(|t| t["id"] == json!(id))
    }

    /// Ticket JSON with its attachment list joined in.
    fn ticket_with_attachments(&self, id: i64) -> Option<Value> {
        let mut ticket = self.tickets.iter().find(|t| t["id"] == json!(id))?.clone();
        let mut ids: Vec<_> = self
            .attachments
            .iter()
            .filter(|(_, a)| a.ticket_id == id)
            .map(|(attachment_id, a)| (*attachment_id, a.filename.clone()))
            .collect();
        ids.sort();
        ticket["attachments"] = ids
            .into_iter()
            .map(|(attachment_id, filename)| json!({"id": attachment_id, "filename": filename}))
            .collect();
        Some(ticket)
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// A running fake backend bound to an ephemeral local port.
pub struct FakeBackend {
    pub url: String,
    pub state: Shared,
}

impl FakeBackend {
    /// Start a backend with no tickets.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            next_id: 100,
            ..Default::default()
        }));
        let url = serve(router(state.clone())).await;
        Self { url, state }
    }

    /// Add a ticket from raw JSON.
    pub fn insert_ticket(&self, ticket: Value) {
        self.state.lock().unwrap().tickets.push(ticket);
    }

    /// Add an attachment to a stored ticket, returning its id.
    pub fn insert_attachment(&self, ticket_id: i64, filename: &str, data: &[u8]) -> i64 {
        let mut state = self.state.lock().unwrap();
        let id = state.take_id();
        state.attachments.insert(
            id,
            StoredAttachment {
                ticket_id,
                filename: filename.to_string(),
                data: data.to_vec(),
            },
        );
        id
    }

    pub fn set_game_names(&self, names: &[&str]) {
        self.state.lock().unwrap().game_names = names.iter().map(|n| n.to_string()).collect();
    }

    /// Raw stored ticket JSON.
    pub fn stored_ticket(&self, id: i64) -> Option<Value> {
        self.state.lock().unwrap().ticket_with_attachments(id)
    }

    pub fn repository(&self) -> HttpTicketRepository {
        repository_for(&self.url)
    }
}

/// Repository client pointed at `url` with a short timeout.
pub fn repository_for(url: &str) -> HttpTicketRepository {
    let mut config = BackendConfig::new(url);
    config.timeout_secs = 5;
    HttpTicketRepository::new(config).unwrap()
}

/// Serve a router on 127.0.0.1 and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn unbound_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/get_tickets", get(list_tickets))
        .route("/get_ticket/{id}", get(get_ticket))
        .route("/submit_ticket", post(submit_ticket))
        .route("/update_ticket/{id}", post(update_ticket))
        .route("/delete_attachment/{id}", delete(delete_attachment))
        .route("/upload_attachment/{id}", post(upload_attachment))
        .route("/attachment/{id}", get(get_attachment))
        .route("/get_game_names", get(game_names))
        .with_state(state)
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "error": format!("{} not found", what)})),
    )
        .into_response()
}

async fn list_tickets(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.list_queries.push(query);
    Json(Value::Array(state.tickets.clone()))
}

async fn get_ticket(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    match state.lock().unwrap().ticket_with_attachments(id) {
        Some(ticket) => Json(ticket).into_response(),
        None => not_found("Ticket"),
    }
}

async fn read_multipart(mut multipart: Multipart) -> (HashMap<String, String>, Vec<ReceivedFile>) {
    let mut form = HashMap::new();
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(filename) => files.push(ReceivedFile {
                field: name,
                filename,
                data: field.bytes().await.unwrap().to_vec(),
            }),
            None => {
                form.insert(name, field.text().await.unwrap());
            }
        }
    }
    (form, files)
}

async fn submit_ticket(State(state): State<Shared>, multipart: Multipart) -> Response {
    let (form, files) = read_multipart(multipart).await;
    let mut state = state.lock().unwrap();
    state.last_form = form.clone();
    state.last_files = files.clone();

    let field = |name: &str| form.get(name).cloned().unwrap_or_default();
    if field("gameName").trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Game name is required"})),
        )
            .into_response();
    }

    let id = state.take_id();
    state.tickets.push(json!({
        "id": id,
        "summary": field("summary"),
        "project": field("project"),
        "workType": field("workType"),
        "status": field("status"),
        "description": field("description"),
        "assignee": field("assignee"),
        "team": field("team"),
        "gameName": field("gameName"),
        "createdAt": "2025-03-01T09:30:00.123456",
    }));
    for file in files.into_iter().filter(|f| f.field == "attachment") {
        let attachment_id = state.take_id();
        state.attachments.insert(
            attachment_id,
            StoredAttachment {
                ticket_id: id,
                filename: file.filename,
                data: file.data,
            },
        );
    }

    Json(json!({
        "success": true,
        "ticket": {
            "id": id,
            "summary": field("summary"),
            "project": field("project"),
            "status": field("status"),
            "workType": field("workType"),
            "gameName": field("gameName"),
        }
    }))
    .into_response()
}

async fn update_ticket(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.last_update = Some(body.clone());
    let Some(ticket) = state.find_mut(id) else {
        return not_found("Ticket");
    };
    for key in [
        "summary",
        "project",
        "workType",
        "status",
        "description",
        "assignee",
        "team",
        "gameName",
    ] {
        if let Some(value) = body.get(key) {
            ticket[key] = value.clone();
        }
    }
    Json(json!({"success": true})).into_response()
}

async fn delete_attachment(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    match state.lock().unwrap().attachments.remove(&id) {
        Some(_) => Json(json!({"success": true})).into_response(),
        None => not_found("Attachment"),
    }
}

async fn upload_attachment(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    let (_, files) = read_multipart(multipart).await;
    let mut state = state.lock().unwrap();
    state.last_files = files.clone();
    if state.find_mut(id).is_none() {
        return not_found("Ticket");
    }
    for file in files.into_iter().filter(|f| f.field == "attachments") {
        let attachment_id = state.take_id();
        state.attachments.insert(
            attachment_id,
            StoredAttachment {
                ticket_id: id,
                filename: file.filename,
                data: file.data,
            },
        );
    }
    Json(json!({"success": true})).into_response()
}

async fn get_attachment(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let state = state.lock().unwrap();
    let Some(attachment) = state.attachments.get(&id) else {
        return (StatusCode::NOT_FOUND, "Attachment not found").into_response();
    };
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment.filename),
            ),
        ],
        attachment.data.clone(),
    )
        .into_response()
}

async fn game_names(State(state): State<Shared>) -> Json<Vec<String>> {
    Json(state.lock().unwrap().game_names.clone())
}

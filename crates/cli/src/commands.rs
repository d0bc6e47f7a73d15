//! Command handlers. Each runs one fetch-then-render cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use kanban_core::{
    attachment_url, AttachmentId, BoardLoader, FileUpload, FilterCriteria, LoadOutcome,
    StaticUserDirectory, Ticket, TicketFields, TicketId, TicketRepository, TicketStatus,
};

use crate::render;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the board grouped by status
    Board {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show one ticket with its attachments
    Show { id: String },
    /// Create a ticket
    Create {
        #[command(flatten)]
        fields: FieldArgs,
        /// File to attach (repeatable)
        #[arg(long = "attach", value_name = "PATH")]
        attach: Vec<PathBuf>,
    },
    /// Update a ticket, then upload any new attachments
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
        /// File to attach (repeatable)
        #[arg(long = "attach", value_name = "PATH")]
        attach: Vec<PathBuf>,
    },
    /// Delete an attachment
    Detach { attachment_id: String },
    /// Download an attachment
    Download {
        attachment_id: String,
        /// Destination file (defaults to the attachment's filename)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List known game names
    Games,
}

#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub work_type: Option<String>,
    #[arg(long)]
    pub game: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    /// Case-insensitive substring of the summary
    #[arg(long)]
    pub search: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            work_type: args.work_type,
            game_name: args.game,
            team: args.team,
            search_text: args.search,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    #[arg(long)]
    pub summary: Option<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub work_type: Option<String>,
    /// Status label, e.g. "In Review" (unknown values become "To Do")
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Assignee user id
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
    #[arg(long)]
    pub game: Option<String>,
}

impl From<FieldArgs> for TicketFields {
    fn from(args: FieldArgs) -> Self {
        TicketFields {
            summary: args.summary,
            project: args.project,
            work_type: args.work_type,
            status: args.status.as_deref().map(TicketStatus::normalize),
            description: args.description,
            assignee: args.assignee,
            team: args.team,
            game_name: args.game,
        }
    }
}

/// Everything a command needs, built once from configuration.
pub struct App {
    pub repository: Arc<dyn TicketRepository>,
    pub users: StaticUserDirectory,
    pub backend_url: String,
    pub fixed_game_name: Option<String>,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl App {
    /// Run a command and return its output.
    pub async fn run(&self, command: Command) -> Result<String> {
        match command {
            Command::Board { filter } => self.board(filter.into()).await,
            Command::Show { id } => self.show(&TicketId::from(id)).await,
            Command::Create { fields, attach } => self.create(fields.into(), &attach).await,
            Command::Update { id, fields, attach } => {
                self.update(&TicketId::from(id), fields.into(), &attach)
                    .await
            }
            Command::Detach { attachment_id } => {
                self.detach(&AttachmentId::from(attachment_id)).await
            }
            Command::Download {
                attachment_id,
                output,
            } => {
                self.download(&AttachmentId::from(attachment_id), output)
                    .await
            }
            Command::Games => self.games().await,
        }
    }

    async fn board(&self, criteria: FilterCriteria) -> Result<String> {
        let loader = BoardLoader::new(Arc::clone(&self.repository))
            .with_fixed_game_name(self.fixed_game_name.clone());

        let view = match loader.load(&criteria).await.context("Failed to load board")? {
            LoadOutcome::Fresh(view) => view,
            LoadOutcome::Stale { seq } => bail!("Board load {} was superseded", seq),
        };

        if self.json {
            return Ok(serde_json::to_string_pretty(&view)?);
        }
        Ok(render::render_board(&view, &self.users).await)
    }

    async fn render_ticket(&self, ticket: &Ticket) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(ticket)?);
        }
        Ok(render::render_ticket(ticket, &self.users, |id| {
            attachment_url(&self.backend_url, id)
        })
        .await)
    }

    async fn show(&self, id: &TicketId) -> Result<String> {
        let ticket = self
            .repository
            .fetch_ticket_by_id(id)
            .await
            .with_context(|| format!("Failed to fetch ticket {}", id))?;
        self.render_ticket(&ticket).await
    }

    async fn create(&self, mut fields: TicketFields, attach: &[PathBuf]) -> Result<String> {
        if let Some(game) = &self.fixed_game_name {
            fields.game_name = Some(game.clone());
        }
        let files = read_uploads(attach).await?;

        let ticket = self
            .repository
            .create_ticket(&fields, files)
            .await
            .context("Failed to create ticket")?;
        info!(ticket_id = %ticket.id, "Ticket created");
        self.render_ticket(&ticket).await
    }

    /// The backend overwrites every column on update, so the full current
    /// field set is sent with the changes applied on top.
    async fn update(
        &self,
        id: &TicketId,
        changes: TicketFields,
        attach: &[PathBuf],
    ) -> Result<String> {
        if changes.is_empty() && attach.is_empty() {
            bail!("Nothing to update: pass at least one field or --attach");
        }
        let files = read_uploads(attach).await?;

        let mut ticket = self
            .repository
            .fetch_ticket_by_id(id)
            .await
            .with_context(|| format!("Failed to fetch ticket {}", id))?;
        // Address the ticket by the id the backend sent, in its wire form.
        let id = &ticket.id.clone();

        if !changes.is_empty() {
            let fields = TicketFields::from_ticket(&ticket).merge(changes);
            ticket = self
                .repository
                .update_ticket(id, &fields)
                .await
                .with_context(|| format!("Failed to update ticket {}", id))?;
            info!(ticket_id = %id, "Ticket updated");
        }

        if !files.is_empty() {
            ticket = self
                .repository
                .add_attachments(id, files)
                .await
                .with_context(|| format!("Failed to upload attachments to ticket {}", id))?;
            info!(ticket_id = %id, "Attachments uploaded");
        }

        self.render_ticket(&ticket).await
    }

    async fn detach(&self, attachment_id: &AttachmentId) -> Result<String> {
        self.repository
            .delete_attachment(attachment_id)
            .await
            .with_context(|| format!("Failed to delete attachment {}", attachment_id))?;
        Ok(format!("Deleted attachment {}\n", attachment_id))
    }

    async fn download(
        &self,
        attachment_id: &AttachmentId,
        output: Option<PathBuf>,
    ) -> Result<String> {
        let content = self
            .repository
            .fetch_attachment(attachment_id)
            .await
            .with_context(|| format!("Failed to download attachment {}", attachment_id))?;

        let path = output.unwrap_or_else(|| {
            PathBuf::from(
                content
                    .filename
                    .as_deref()
                    .and_then(|name| Path::new(name).file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("attachment-{}", attachment_id)),
            )
        });
        tokio::fs::write(&path, &content.data)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(format!(
            "Saved {} bytes to {}\n",
            content.data.len(),
            path.display()
        ))
    }

    async fn games(&self) -> Result<String> {
        let names = self
            .repository
            .fetch_game_names()
            .await
            .context("Failed to fetch game names")?;
        if self.json {
            return Ok(serde_json::to_string_pretty(&names)?);
        }
        Ok(render::render_game_names(&names))
    }
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<FileUpload>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = FileUpload::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::testing::{fixtures, MockTicketRepository, RecordedCall};
    use kanban_core::{AttachmentContent, RepositoryError, User};
    use tempfile::TempDir;

    fn app(repository: &MockTicketRepository) -> App {
        App {
            repository: Arc::new(repository.clone()),
            users: StaticUserDirectory::new([User::new("42", "Ada Lovelace")]),
            backend_url: "http://tracker.local".to_string(),
            fixed_game_name: None,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_board_renders_filtered_columns() {
        let repository = MockTicketRepository::new();
        repository.set_tickets(fixtures::sample_tickets()).await;

        let out = app(&repository)
            .run(Command::Board {
                filter: FilterArgs {
                    work_type: Some("Bug".to_string()),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert!(out.contains("Fix login bug"));
        assert!(out.contains("Crash on track load"));
        assert!(!out.contains("Add leaderboard"));
    }

    #[tokio::test]
    async fn test_board_json_output() {
        let repository = MockTicketRepository::new();
        repository.set_tickets(fixtures::sample_tickets()).await;
        let mut app = app(&repository);
        app.json = true;

        let out = app
            .run(Command::Board {
                filter: FilterArgs::default(),
            })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["fetched"], 5);
    }

    #[tokio::test]
    async fn test_create_uses_fixed_game_and_reads_files() {
        let repository = MockTicketRepository::new();
        let mut app = app(&repository);
        app.fixed_game_name = Some("Racer".to_string());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crash.log");
        std::fs::write(&path, b"trace").unwrap();

        let out = app
            .run(Command::Create {
                fields: FieldArgs {
                    summary: Some("Crash".to_string()),
                    game: Some("Ignored".to_string()),
                    ..Default::default()
                },
                attach: vec![path],
            })
            .await
            .unwrap();

        assert!(out.contains("Game:       Racer"));
        assert!(out.contains("crash.log"));
        let tickets = repository.tickets().await;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].game_name, "Racer");
    }

    #[tokio::test]
    async fn test_create_missing_file_fails_before_request() {
        let repository = MockTicketRepository::new();
        let result = app(&repository)
            .run(Command::Create {
                fields: FieldArgs {
                    game: Some("Racer".to_string()),
                    ..Default::default()
                },
                attach: vec![PathBuf::from("/nonexistent/file.png")],
            })
            .await;

        assert!(result.is_err());
        assert!(repository.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_full_field_set() {
        let repository = MockTicketRepository::new();
        repository.set_tickets(fixtures::sample_tickets()).await;

        app(&repository)
            .run(Command::Update {
                id: "1".to_string(),
                fields: FieldArgs {
                    status: Some("in review".to_string()),
                    ..Default::default()
                },
                attach: Vec::new(),
            })
            .await
            .unwrap();

        let (id, update) = repository
            .calls()
            .await
            .into_iter()
            .find_map(|call| match call {
                RecordedCall::Update { id, fields } => Some((id, fields)),
                _ => None,
            })
            .unwrap();
        // The typed "1" is replaced by the backend's numeric id.
        assert!(id.is_numeric());
        assert_eq!(id.as_str(), "1");
        assert_eq!(update.status, Some(TicketStatus::InReview));
        assert_eq!(update.summary.as_deref(), Some("Fix login bug"));
        assert_eq!(update.game_name.as_deref(), Some("Space Game"));
        assert_eq!(update.assignee.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_update_without_changes_is_rejected() {
        let repository = MockTicketRepository::new();
        let result = app(&repository)
            .run(Command::Update {
                id: "1".to_string(),
                fields: FieldArgs::default(),
                attach: Vec::new(),
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_show_unknown_ticket_reports_not_found() {
        let repository = MockTicketRepository::new();
        let err = app(&repository)
            .run(Command::Show {
                id: "404".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let repository = MockTicketRepository::new();
        repository
            .set_attachment_content(
                "9",
                AttachmentContent {
                    filename: Some("../shot.png".to_string()),
                    content_type: Some("image/png".to_string()),
                    data: vec![1, 2, 3],
                },
            )
            .await;

        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.png");
        let out = app(&repository)
            .run(Command::Download {
                attachment_id: "9".to_string(),
                output: Some(output.clone()),
            })
            .await
            .unwrap();

        assert!(out.starts_with("Saved 3 bytes"));
        assert_eq!(std::fs::read(&output).unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_games_lists_names() {
        let repository = MockTicketRepository::new();
        repository
            .set_game_names(vec!["Racer".to_string(), "Space Game".to_string()])
            .await;

        let out = app(&repository).run(Command::Games).await.unwrap();
        assert_eq!(out, "Racer\nSpace Game\n");
    }
}

pub mod board;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod repository;
pub mod testing;
pub mod ticket;
pub mod users;

pub use board::{BoardLoader, BoardView, LoadOutcome, RequestSequencer};
pub use config::{
    load_config, load_config_from_str, validate_config, BackendConfig, BoardConfig, Config,
    ConfigError, UserConfig, ENV_PREFIX,
};
pub use filter::{Column, FilterCriteria, FilterEngine, StatusBoard};
pub use repository::{attachment_url, HttpTicketRepository, RepositoryError, TicketRepository};
pub use ticket::{
    Attachment, AttachmentContent, AttachmentId, FileUpload, Ticket, TicketFields, TicketId,
    TicketStatus,
};
pub use users::{assignee_label, StaticUserDirectory, User, UserDirectory, UNASSIGNED_LABEL};

//! Ticket data model: tickets, statuses, attachments and edit payloads.

mod fields;
mod status;
mod types;

pub use fields::{AttachmentContent, FileUpload, TicketFields};
pub use status::TicketStatus;
pub use types::{
    parse_timestamp, unique_attachments, Attachment, AttachmentId, Ticket, TicketId,
};

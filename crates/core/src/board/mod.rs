//! Board loading with last-request-wins semantics.

mod loader;
mod sequence;

pub use loader::{BoardLoader, BoardView, LoadOutcome};
pub use sequence::RequestSequencer;

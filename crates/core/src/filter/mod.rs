//! Filtering and column partitioning of fetched tickets.

mod board;
mod criteria;
mod engine;

pub use board::{Column, StatusBoard};
pub use criteria::FilterCriteria;
pub use engine::{apply, FilterEngine};

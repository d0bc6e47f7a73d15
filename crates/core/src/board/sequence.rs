//! Monotonic request numbering for last-request-wins.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues increasing sequence numbers to outgoing requests.
///
/// A response is current only if no newer number was issued while it was
/// in flight.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a new request. The first number issued is 1.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Most recently issued number (0 if none).
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest() == seq
    }
}

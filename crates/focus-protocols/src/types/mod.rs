//! Records exchanged between contexts and persisted in the store.

mod analysis;
mod relevance;
mod session;
mod summary;
mod transcript;

pub use analysis::*;
pub use relevance::*;
pub use session::*;
pub use summary::*;
pub use transcript::*;

/// Milliseconds since the Unix epoch, the timestamp unit used in stored records.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

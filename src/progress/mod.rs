//! Progress Module
//!
//! Durable record of completed puzzles and unlocked journal entries, and
//! the derived unlock state computed from it.
//!
//! ## Module Structure
//!
//! - `store`: the async key-value port and its adapters
//! - `record`: `UserProgress`, `ProgressStore`, derived unlock rules

pub mod store;
pub mod record;

pub use store::{KeyValueStore, MemoryStore, FileStore};
pub use record::{
    UserProgress, ProgressStore, CompletionRecord, CompletionOutcome,
    PuzzleStatus, JournalEntry, derive_puzzle_states, DEFAULT_PROGRESS_KEY,
};

/// Persistence errors. Caught at the progress store boundary and logged;
/// surfaced only as return values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The backend failed to read or write.
    #[error("Persistence unavailable: {0}")]
    Unavailable(String),

    /// Progress could not be encoded.
    #[error("Failed to encode progress: {0}")]
    Encode(String),

    /// Key cannot be stored by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

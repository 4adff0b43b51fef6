//! User Progress and the Progress Store
//!
//! `UserProgress` is the only thing this crate persists. It is stored as
//! one JSON object under a single key:
//!
//! ```text
//! { "completedPuzzleIds": ["1", "2"], "unlockedJournalIds": ["1", "2"] }
//! ```
//!
//! ## Failure semantics
//!
//! - Missing or undecodable data loads as empty progress (a new player).
//! - Backend failures are logged and reported through return values; they
//!   never escape as errors the caller must handle to keep playing.
//! - Every read-modify-write runs under one async mutex, so no load sees
//!   half of an update.

use std::sync::Arc;

use serde::{Serialize, Deserialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::DEFAULT_UNLOCK_WINDOW;
use crate::puzzle::catalog::{Catalog, PuzzleDefinition};

use super::store::KeyValueStore;
use super::PersistenceError;

/// Default storage key for progress.
pub const DEFAULT_PROGRESS_KEY: &str = "esoterica-progress";

/// Completed puzzles and unlocked journal entries.
///
/// Both lists are append-only and duplicate-free. Every completed id is
/// also an unlocked journal id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    /// Completed puzzle ids, in completion order.
    #[serde(default, alias = "completedPuzzles")]
    pub completed_puzzle_ids: Vec<String>,
    /// Journal entries the player may read.
    #[serde(default, alias = "unlockedJournalEntries")]
    pub unlocked_journal_ids: Vec<String>,
}

impl UserProgress {
    /// Has this puzzle been completed?
    pub fn is_completed(&self, puzzle_id: &str) -> bool {
        self.completed_puzzle_ids.iter().any(|id| id == puzzle_id)
    }

    /// Is this journal entry readable?
    pub fn is_journal_unlocked(&self, puzzle_id: &str) -> bool {
        self.unlocked_journal_ids.iter().any(|id| id == puzzle_id)
    }

    /// Record a completion. Returns false if it was already recorded.
    pub fn record_completion(&mut self, puzzle_id: &str) -> bool {
        if self.is_completed(puzzle_id) {
            return false;
        }
        self.completed_puzzle_ids.push(puzzle_id.to_string());
        if !self.is_journal_unlocked(puzzle_id) {
            self.unlocked_journal_ids.push(puzzle_id.to_string());
        }
        true
    }

    /// Drop duplicates and restore `journal ⊇ completed` on data written
    /// by older or foreign clients.
    fn normalize(mut self) -> Self {
        dedup_in_order(&mut self.completed_puzzle_ids);
        dedup_in_order(&mut self.unlocked_journal_ids);
        for id in &self.completed_puzzle_ids {
            if !self.unlocked_journal_ids.contains(id) {
                self.unlocked_journal_ids.push(id.clone());
            }
        }
        self
    }
}

fn dedup_in_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// What `complete()` did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Newly completed and written to storage.
    Recorded,
    /// Already completed; nothing was written.
    AlreadyCompleted,
    /// Completion could not be made durable.
    NotPersisted(PersistenceError),
}

/// Result of `complete()`: the progress as the caller should now see it,
/// and whether it reached storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Progress including this completion.
    pub progress: UserProgress,
    /// Persistence outcome.
    pub outcome: CompletionOutcome,
}

impl CompletionRecord {
    /// True when storage holds this completion.
    pub fn is_durable(&self) -> bool {
        !matches!(self.outcome, CompletionOutcome::NotPersisted(_))
    }
}

/// A catalog puzzle with its derived state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PuzzleStatus<'a> {
    /// The puzzle.
    pub puzzle: &'a PuzzleDefinition,
    /// In `completedPuzzleIds`.
    pub is_completed: bool,
    /// Playable.
    pub is_unlocked: bool,
}

/// A readable journal entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JournalEntry<'a> {
    /// Puzzle that unlocked it.
    pub puzzle_id: &'a str,
    /// Entry title.
    pub title: &'a str,
    /// Entry body.
    pub body: &'a str,
    /// Quote shown with the entry.
    pub quote: &'a str,
    /// Quote attribution.
    pub attribution: &'a str,
    /// Completion media to show alongside.
    pub media: &'a str,
}

/// Derive `(puzzle, completed, unlocked)` for every catalog entry.
///
/// A puzzle is unlocked if it is unlocked by default, completed, or its
/// sequence is at most `window` past the highest completed sequence.
/// Completed ids missing from the catalog take no part in unlocking.
pub fn derive_puzzle_states<'a>(
    catalog: &'a Catalog,
    progress: &UserProgress,
    window: u32,
) -> Vec<PuzzleStatus<'a>> {
    let reach = catalog
        .iter()
        .filter(|p| progress.is_completed(&p.id))
        .map(|p| p.sequence.saturating_add(window))
        .max();

    catalog
        .iter()
        .map(|puzzle| {
            let is_completed = progress.is_completed(&puzzle.id);
            let is_unlocked = puzzle.unlocked_by_default
                || is_completed
                || reach.is_some_and(|reach| puzzle.sequence <= reach);
            PuzzleStatus {
                puzzle,
                is_completed,
                is_unlocked,
            }
        })
        .collect()
}

/// Durable progress, shared by every session in the process.
pub struct ProgressStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    unlock_window: u32,
    /// Serializes every access to `key`.
    lock: Mutex<()>,
}

impl ProgressStore {
    /// Create a store writing `key` on `backend`.
    pub fn new(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            unlock_window: DEFAULT_UNLOCK_WINDOW,
            lock: Mutex::new(()),
        }
    }

    /// Override the unlock window.
    pub fn with_unlock_window(mut self, window: u32) -> Self {
        self.unlock_window = window;
        self
    }

    /// Unlock window in use.
    pub fn unlock_window(&self) -> u32 {
        self.unlock_window
    }

    /// Read current progress. Never fails: absent, corrupt or unreadable
    /// data all yield empty progress.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn load(&self) -> UserProgress {
        let _guard = self.lock.lock().await;
        match self.read().await {
            Ok(progress) => progress,
            Err(e) => {
                warn!("Failed to load progress, starting empty: {}", e);
                UserProgress::default()
            }
        }
    }

    /// Write the full progress object.
    #[instrument(skip(self, progress), fields(key = %self.key))]
    pub async fn save(&self, progress: &UserProgress) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().await;
        let result = self.write(progress).await;
        if let Err(e) = &result {
            warn!("Failed to save progress: {}", e);
        }
        result
    }

    /// Mark a puzzle completed.
    ///
    /// Writes only when the puzzle was not already completed. If stored
    /// progress cannot be read, nothing is written, so a transient read
    /// failure never overwrites earlier completions.
    #[instrument(skip(self), fields(key = %self.key))]
    pub async fn complete(&self, puzzle_id: &str) -> CompletionRecord {
        let _guard = self.lock.lock().await;

        let mut progress = match self.read().await {
            Ok(progress) => progress,
            Err(e) => {
                warn!("Failed to read progress before completing {}: {}", puzzle_id, e);
                let mut progress = UserProgress::default();
                progress.record_completion(puzzle_id);
                return CompletionRecord {
                    progress,
                    outcome: CompletionOutcome::NotPersisted(e),
                };
            }
        };

        if !progress.record_completion(puzzle_id) {
            debug!("Puzzle {} already completed", puzzle_id);
            return CompletionRecord {
                progress,
                outcome: CompletionOutcome::AlreadyCompleted,
            };
        }

        let outcome = match self.write(&progress).await {
            Ok(()) => {
                info!("Puzzle {} completed ({} total)", puzzle_id, progress.completed_puzzle_ids.len());
                CompletionOutcome::Recorded
            }
            Err(e) => {
                warn!("Completion of {} not persisted: {}", puzzle_id, e);
                CompletionOutcome::NotPersisted(e)
            }
        };

        CompletionRecord { progress, outcome }
    }

    /// Has this puzzle been completed?
    pub async fn is_completed(&self, puzzle_id: &str) -> bool {
        self.load().await.is_completed(puzzle_id)
    }

    /// Every catalog puzzle with its completed/unlocked flags.
    pub async fn puzzles_with_derived_state<'a>(&self, catalog: &'a Catalog) -> Vec<PuzzleStatus<'a>> {
        let progress = self.load().await;
        derive_puzzle_states(catalog, &progress, self.unlock_window)
    }

    /// Unlocked journal entries, in catalog order.
    pub async fn journal_entries<'a>(&self, catalog: &'a Catalog) -> Vec<JournalEntry<'a>> {
        let progress = self.load().await;
        catalog
            .iter()
            .filter(|p| progress.is_journal_unlocked(&p.id))
            .map(|p| JournalEntry {
                puzzle_id: &p.id,
                title: &p.journal_title,
                body: &p.journal_body,
                quote: &p.narrative_text,
                attribution: &p.attribution_text,
                media: &p.completion_media,
            })
            .collect()
    }

    async fn read(&self) -> Result<UserProgress, PersistenceError> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            debug!("No stored progress");
            return Ok(UserProgress::default());
        };
        match serde_json::from_str::<UserProgress>(&raw) {
            Ok(progress) => Ok(progress.normalize()),
            Err(e) => {
                warn!("Stored progress is corrupt, treating as absent: {}", e);
                Ok(UserProgress::default())
            }
        }
    }

    async fn write(&self, progress: &UserProgress) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(progress)
            .map_err(|e| PersistenceError::Encode(e.to_string()))?;
        self.backend.set(&self.key, &encoded).await
    }
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("key", &self.key)
            .field("unlock_window", &self.unlock_window)
            .finish_non_exhaustive()
    }
}

//! Game Context
//!
//! The process-wide handle a presentation layer holds: the catalog, the
//! shared progress store, the engine config and the completion channel.
//! Sessions are opened through it so that every session writes to the
//! same store and publishes on the same channel.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::progress::{JournalEntry, KeyValueStore, ProgressStore, PuzzleStatus};
use crate::puzzle::catalog::{Catalog, CatalogError};
use crate::puzzle::events::CompletionEvent;
use crate::puzzle::layout::{BoardSize, InteractionMode};
use crate::puzzle::session::{PuzzleSession, SessionError};

/// Shared engine state.
#[derive(Debug, Clone)]
pub struct GameContext {
    catalog: Arc<Catalog>,
    progress: Arc<ProgressStore>,
    config: EngineConfig,
    completions: broadcast::Sender<CompletionEvent>,
}

impl GameContext {
    /// Build a context over `backend`, using the config's key and unlock window.
    pub fn new(catalog: Catalog, backend: Arc<dyn KeyValueStore>, config: EngineConfig) -> Self {
        let progress = ProgressStore::new(backend, config.progress_key.clone())
            .with_unlock_window(config.unlock_window);
        let (completions, _) = broadcast::channel(config.completion_channel_capacity.max(1));

        info!(
            "Game context ready: {} puzzles, unlock window {}",
            catalog.len(),
            config.unlock_window
        );

        Self {
            catalog: Arc::new(catalog),
            progress: Arc::new(progress),
            config,
            completions,
        }
    }

    /// Puzzle catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared progress store.
    pub fn progress(&self) -> &Arc<ProgressStore> {
        &self.progress
    }

    /// Engine config.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receive every completion from sessions opened on this context.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.completions.subscribe()
    }

    /// Open and start a session for an unlocked puzzle.
    #[instrument(skip(self))]
    pub async fn open_session(
        &self,
        puzzle_id: &str,
        mode: InteractionMode,
        board: BoardSize,
    ) -> Result<PuzzleSession, ContextError> {
        let puzzle = self.catalog.get(puzzle_id).map_err(|e| match e {
            CatalogError::NotFound(id) => ContextError::NotFound(id),
            other => ContextError::Catalog(other.to_string()),
        })?;

        let unlocked = self
            .progress
            .puzzles_with_derived_state(&self.catalog)
            .await
            .iter()
            .any(|status| status.puzzle.id == puzzle_id && status.is_unlocked);
        if !unlocked {
            warn!("Refusing to open locked puzzle {}", puzzle_id);
            return Err(ContextError::Locked(puzzle_id.to_string()));
        }

        let mut session = PuzzleSession::new(
            puzzle.clone(),
            mode,
            self.config.session_config(),
            self.progress.clone(),
            self.completions.clone(),
        );
        session.start(board)?;
        Ok(session)
    }

    /// Open a session on a board sized by the config's sizing rule.
    pub async fn open_session_with_recommended_board(
        &self,
        puzzle_id: &str,
        mode: InteractionMode,
    ) -> Result<PuzzleSession, ContextError> {
        let grid = self
            .catalog
            .get(puzzle_id)
            .map_err(|_| ContextError::NotFound(puzzle_id.to_string()))?
            .grid_size;
        let board = BoardSize::recommended(grid, &self.config.board);
        self.open_session(puzzle_id, mode, board).await
    }

    /// Every catalog puzzle with its derived completed/unlocked flags.
    pub async fn puzzle_overview(&self) -> Vec<PuzzleStatus<'_>> {
        self.progress.puzzles_with_derived_state(&self.catalog).await
    }

    /// Readable journal entries in catalog order.
    pub async fn journal(&self) -> Vec<JournalEntry<'_>> {
        self.progress.journal_entries(&self.catalog).await
    }
}

/// Errors opening a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    /// No such puzzle.
    #[error("Puzzle not found: {0}")]
    NotFound(String),

    /// Puzzle exists but is not unlocked yet.
    #[error("Puzzle is locked: {0}")]
    Locked(String),

    /// Catalog lookup failed for another reason.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Session could not start.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

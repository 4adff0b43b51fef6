//! Puzzle Session Controller
//!
//! Owns the live pieces of one puzzle attempt and drives the
//! `Initializing -> InProgress -> Completed` lifecycle.
//!
//! ## Completion guarantee
//!
//! The `InProgress -> Completed` transition is one-shot per playthrough.
//! Its side effects (a single `ProgressStore::complete` call and a single
//! broadcast [`CompletionEvent`]) happen exactly once, however many later
//! moves leave the board solved. Only [`PuzzleSession::reset`] re-arms it.
//!
//! The completion write runs as a task on the Tokio runtime the session
//! was started on, so piece handling never waits on storage and the write
//! survives the session being dropped. A session therefore cannot start
//! without a runtime. [`PuzzleSession::persisted`] awaits the write when
//! the caller needs to know it landed.

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::core::rng::{derive_layout_seed, fresh_seed, DeterministicRng};
use crate::core::vec2::Vec2;
use crate::progress::{CompletionRecord, ProgressStore};
use crate::puzzle::catalog::PuzzleDefinition;
use crate::puzzle::events::{CompletionEvent, SessionEvent};
use crate::puzzle::layout::{
    generate_layout_with_rng, BoardSize, InteractionMode, LayoutError, Piece, PiecePosition,
};
use crate::puzzle::placement::{all_placed, is_placed, placed_count};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for board dimensions.
    Initializing,
    /// Pieces dealt, not yet solved.
    InProgress,
    /// Solved.
    Completed,
}

/// Placement rules for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Continuous-mode tolerance (pixels, per axis).
    pub tolerance_px: f32,
    /// Snap free pieces onto their target once within tolerance.
    pub snap_to_target: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        EngineConfig::default().session_config()
    }
}

impl EngineConfig {
    /// Session placement rules from the engine config.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            tolerance_px: self.placement_tolerance_px,
            snap_to_target: self.snap_to_target,
        }
    }
}

/// One puzzle-solving attempt.
pub struct PuzzleSession {
    id: Uuid,
    puzzle: PuzzleDefinition,
    mode: InteractionMode,
    config: SessionConfig,
    state: SessionState,
    board: Option<BoardSize>,
    pieces: Vec<Piece>,
    selected: Option<usize>,
    seed: u64,
    playthrough: u32,
    progress: Arc<ProgressStore>,
    completions: broadcast::Sender<CompletionEvent>,
    runtime: Option<Handle>,
    pending_write: Option<JoinHandle<CompletionRecord>>,
    last_record: Option<CompletionRecord>,
}

impl PuzzleSession {
    /// Create a session in `Initializing`.
    pub fn new(
        puzzle: PuzzleDefinition,
        mode: InteractionMode,
        config: SessionConfig,
        progress: Arc<ProgressStore>,
        completions: broadcast::Sender<CompletionEvent>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            puzzle,
            mode,
            config,
            state: SessionState::Initializing,
            board: None,
            pieces: Vec::new(),
            selected: None,
            seed: 0,
            playthrough: 0,
            progress,
            completions,
            runtime: None,
            pending_write: None,
            last_record: None,
        }
    }

    /// Run completion writes on `runtime` instead of the one current at start.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Deal the first layout once the board size is known.
    pub fn start(&mut self, board: BoardSize) -> Result<Vec<SessionEvent>, SessionError> {
        let seed = derive_layout_seed(&self.puzzle.id, fresh_seed());
        self.start_with_seed(board, seed)
    }

    /// Deal the first layout from a known seed.
    pub fn start_with_seed(&mut self, board: BoardSize, seed: u64) -> Result<Vec<SessionEvent>, SessionError> {
        if self.state != SessionState::Initializing {
            return Err(SessionError::InvalidState(self.state));
        }
        if self.runtime.is_none() {
            self.runtime = Some(Handle::try_current().map_err(|_| SessionError::NoRuntime)?);
        }

        let mut events = Vec::new();
        self.deal(board, seed, &mut events)?;
        self.board = Some(board);
        self.state = SessionState::InProgress;

        info!(
            "Session {} started: puzzle {} ({:?}, {}x{}, seed {:#018x})",
            self.id, self.puzzle.id, self.mode, self.puzzle.grid_size, self.puzzle.grid_size, seed
        );

        self.check_completion(&mut events);
        Ok(events)
    }

    /// Continuous mode: drop piece `index` at `(x, y)`.
    ///
    /// Also accepted after completion (a solved piece can be nudged), but
    /// completion never fires twice.
    pub fn move_piece(&mut self, index: usize, x: f32, y: f32) -> Result<Vec<SessionEvent>, SessionError> {
        self.require_mode(InteractionMode::Continuous)?;
        if self.state == SessionState::Initializing {
            return Err(SessionError::InvalidState(self.state));
        }
        let position = Vec2::new(x, y);
        if !position.is_finite() {
            return Err(SessionError::InvalidPosition { x, y });
        }

        let tolerance = self.config.tolerance_px;
        let snap = self.config.snap_to_target;
        let piece = self.pieces.get_mut(index).ok_or(SessionError::PieceNotFound(index))?;

        piece.current = PiecePosition::Free(position);
        let mut events = Vec::with_capacity(2);
        if snap && is_placed(piece, tolerance) {
            piece.current = PiecePosition::Free(piece.target);
            events.push(SessionEvent::PieceSnapped { index, position: piece.target });
        } else {
            events.push(SessionEvent::PieceMoved { index, position });
        }

        self.check_completion(&mut events);
        Ok(events)
    }

    /// Discrete mode: tap piece `index`.
    ///
    /// The first tap selects. Tapping the selected piece again clears the
    /// selection. Tapping a different piece swaps the two pieces' slots and
    /// clears the selection.
    pub fn select_or_swap(&mut self, index: usize) -> Result<Vec<SessionEvent>, SessionError> {
        self.require_mode(InteractionMode::Discrete)?;
        match self.state {
            SessionState::Initializing => return Err(SessionError::InvalidState(self.state)),
            SessionState::Completed => return Err(SessionError::SessionCompleted),
            SessionState::InProgress => {}
        }
        if index >= self.pieces.len() {
            return Err(SessionError::PieceNotFound(index));
        }

        let mut events = Vec::with_capacity(3);
        match self.selected {
            None => {
                self.selected = Some(index);
                events.push(SessionEvent::SelectionChanged { selected: Some(index) });
            }
            Some(selected) if selected == index => {
                self.selected = None;
                events.push(SessionEvent::SelectionChanged { selected: None });
            }
            Some(selected) => {
                let slot = self.pieces[selected].current;
                self.pieces[selected].current = self.pieces[index].current;
                self.pieces[index].current = slot;
                self.selected = None;

                debug!("Swapped pieces {} and {}", selected, index);
                events.push(SessionEvent::PiecesSwapped { first: selected, second: index });
                events.push(SessionEvent::SelectionChanged { selected: None });
                self.check_completion(&mut events);
            }
        }
        Ok(events)
    }

    /// Reshuffle for another playthrough. Stored progress is untouched.
    pub fn reset(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        let seed = derive_layout_seed(&self.puzzle.id, fresh_seed());
        self.reset_with_seed(seed)
    }

    /// Reshuffle from a known seed.
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<Vec<SessionEvent>, SessionError> {
        let board = match (self.state, self.board) {
            (SessionState::Initializing, _) | (_, None) => {
                return Err(SessionError::InvalidState(self.state));
            }
            (_, Some(board)) => board,
        };

        let mut events = Vec::new();
        self.deal(board, seed, &mut events)?;
        self.selected = None;
        self.state = SessionState::InProgress;
        self.playthrough += 1;
        events.push(SessionEvent::Reset { playthrough: self.playthrough });

        info!("Session {} reset (playthrough {})", self.id, self.playthrough);

        self.check_completion(&mut events);
        Ok(events)
    }

    /// Wait for the most recent completion write and report its outcome.
    ///
    /// Returns `None` if the board has never been solved.
    pub async fn persisted(&mut self) -> Option<CompletionRecord> {
        if let Some(handle) = self.pending_write.take() {
            match handle.await {
                Ok(record) => self.last_record = Some(record),
                Err(e) => error!("Completion write task failed: {}", e),
            }
        }
        self.last_record.clone()
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Session id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Puzzle being played.
    pub fn puzzle(&self) -> &PuzzleDefinition {
        &self.puzzle
    }

    /// Interaction mode.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Live pieces, indexed by piece index.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Board size, once started.
    pub fn board(&self) -> Option<BoardSize> {
        self.board
    }

    /// Seed of the current layout.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Resets so far.
    pub fn playthrough(&self) -> u32 {
        self.playthrough
    }

    /// Discrete-mode pending selection.
    pub fn pending_selection(&self) -> Option<usize> {
        self.selected
    }

    /// Solved this playthrough.
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// Is a single piece on its target?
    pub fn is_piece_placed(&self, index: usize) -> Option<bool> {
        self.pieces.get(index).map(|p| is_placed(p, self.config.tolerance_px))
    }

    /// Pieces currently on their targets.
    pub fn placed_count(&self) -> usize {
        placed_count(&self.pieces, self.config.tolerance_px)
    }

    /// Subscribe to completion events from every session sharing this channel.
    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.completions.subscribe()
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn require_mode(&self, mode: InteractionMode) -> Result<(), SessionError> {
        if self.mode != mode {
            return Err(SessionError::WrongMode(self.mode));
        }
        Ok(())
    }

    fn deal(&mut self, board: BoardSize, seed: u64, events: &mut Vec<SessionEvent>) -> Result<(), LayoutError> {
        let mut rng = DeterministicRng::new(seed);
        self.pieces = generate_layout_with_rng(&self.puzzle, board, self.mode, &mut rng)?;
        self.seed = seed;
        events.push(SessionEvent::LayoutDealt {
            seed,
            piece_count: self.pieces.len(),
        });
        Ok(())
    }

    /// The one-shot `InProgress -> Completed` transition.
    fn check_completion(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state != SessionState::InProgress
            || self.pieces.is_empty()
            || !all_placed(&self.pieces, self.config.tolerance_px)
        {
            return;
        }

        self.state = SessionState::Completed;
        self.selected = None;
        info!("Session {} completed puzzle {}", self.id, self.puzzle.id);

        self.spawn_completion_write();

        let event = CompletionEvent {
            session_id: self.id,
            puzzle_id: self.puzzle.id.clone(),
            mode: self.mode,
            playthrough: self.playthrough,
            completed_at: Utc::now(),
        };
        if self.completions.send(event.clone()).is_err() {
            debug!("No completion subscribers");
        }
        events.push(SessionEvent::Completed(event));
    }

    /// Detached write on the session's runtime. Dropping the session
    /// does not cancel it.
    fn spawn_completion_write(&mut self) {
        let Some(runtime) = &self.runtime else {
            // start() guarantees a runtime before any completion
            error!("Session {} completed without a runtime", self.id);
            return;
        };
        let puzzle_id = self.puzzle.id.clone();
        let progress = self.progress.clone();
        self.pending_write = Some(runtime.spawn(async move { progress.complete(&puzzle_id).await }));
    }
}

impl std::fmt::Debug for PuzzleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleSession")
            .field("id", &self.id)
            .field("puzzle", &self.puzzle.id)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("pieces", &self.pieces.len())
            .field("playthrough", &self.playthrough)
            .finish_non_exhaustive()
    }
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Layout could not be generated.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Operation not allowed in the current state.
    #[error("Invalid session state: {0:?}")]
    InvalidState(SessionState),

    /// Operation belongs to the other interaction mode.
    #[error("Operation not supported in {0:?} mode")]
    WrongMode(InteractionMode),

    /// No piece with this index.
    #[error("Piece not found: {0}")]
    PieceNotFound(usize),

    /// Non-finite coordinates.
    #[error("Invalid position ({x}, {y})")]
    InvalidPosition {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },

    /// Board is already solved.
    #[error("Puzzle already completed")]
    SessionCompleted,

    /// Started outside a Tokio runtime with none supplied.
    #[error("No async runtime available for completion writes")]
    NoRuntime,
}

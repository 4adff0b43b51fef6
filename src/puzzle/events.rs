//! Session Events
//!
//! What changed on the board, in the order it happened, for a
//! presentation layer to animate. Every session entry point returns the
//! events it produced.

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::core::vec2::Vec2;
use crate::puzzle::layout::InteractionMode;

/// Broadcast once per playthrough when the board is first solved.
///
/// An ad-timing collaborator may delay the completion screen on seeing
/// this, but has no way to alter the stored completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Session that completed.
    pub session_id: Uuid,
    /// Completed puzzle.
    pub puzzle_id: String,
    /// How it was played.
    pub mode: InteractionMode,
    /// Playthrough number within the session (0 before any reset).
    pub playthrough: u32,
    /// Wall-clock completion time.
    pub completed_at: DateTime<Utc>,
}

/// A change produced by a session entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A fresh layout was dealt.
    LayoutDealt {
        /// Seed the layout was generated from.
        seed: u64,
        /// Number of pieces.
        piece_count: usize,
    },

    /// A free piece was moved.
    PieceMoved {
        /// Piece index.
        index: usize,
        /// New top-left position.
        position: Vec2,
    },

    /// A free piece landed within tolerance and snapped onto its target.
    PieceSnapped {
        /// Piece index.
        index: usize,
        /// Target it snapped to.
        position: Vec2,
    },

    /// The pending discrete-mode selection changed.
    SelectionChanged {
        /// Selected piece, if any.
        selected: Option<usize>,
    },

    /// Two discrete-mode pieces exchanged slots.
    PiecesSwapped {
        /// First piece selected.
        first: usize,
        /// Second piece selected.
        second: usize,
    },

    /// The board was solved.
    Completed(CompletionEvent),

    /// The board was reshuffled for another playthrough.
    Reset {
        /// New playthrough number.
        playthrough: u32,
    },
}

impl SessionEvent {
    /// Is this the completion event?
    pub fn is_completion(&self) -> bool {
        matches!(self, SessionEvent::Completed(_))
    }
}

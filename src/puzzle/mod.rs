//! Puzzle Module
//!
//! Everything needed to play one puzzle: the catalog it comes from, the
//! scattered layout, the placement rules and the session that ties them
//! together.
//!
//! ## Module Structure
//!
//! - `catalog`: static puzzle definitions
//! - `layout`: board geometry and scatter generation
//! - `placement`: "is this piece home?" rules per mode
//! - `events`: what a session reports back to the presentation layer
//! - `session`: the per-attempt state machine

pub mod catalog;
pub mod layout;
pub mod placement;
pub mod events;
pub mod session;

pub use catalog::{Catalog, CatalogError, Difficulty, PuzzleDefinition};
pub use layout::{
    generate_layout, generate_layout_with_rng, solved_layout, source_region,
    BoardSize, ImageRegion, InteractionMode, LayoutError, Piece, PiecePosition, Slot,
};
pub use placement::{all_placed, is_placed, placed_count, DEFAULT_TOLERANCE_PX};
pub use events::{CompletionEvent, SessionEvent};
pub use session::{PuzzleSession, SessionConfig, SessionError, SessionState};

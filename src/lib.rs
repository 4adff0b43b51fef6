//! # Esoterica Puzzle Engine
//!
//! Sliced-image puzzles with two ways to play, a one-shot completion
//! transition, and durable progress that unlocks later puzzles and
//! journal entries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ESOTERICA ENGINE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - Pixel-space 2D vector                     │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  puzzle/         - Playing one puzzle                        │
//! │  ├── catalog.rs  - Static puzzle definitions                 │
//! │  ├── layout.rs   - Board geometry and scatter generation     │
//! │  ├── placement.rs- Tolerance / exact-slot placement rules    │
//! │  ├── events.rs   - Session and completion events             │
//! │  └── session.rs  - Per-attempt state machine                 │
//! │                                                              │
//! │  progress/       - Durable state (async)                     │
//! │  ├── store.rs    - Key-value port, memory and file adapters  │
//! │  └── record.rs   - UserProgress, unlock derivation           │
//! │                                                              │
//! │  config.rs       - Engine tunables                           │
//! │  context.rs      - Shared catalog + store + channel          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Completion Guarantee
//!
//! A session moves `Initializing -> InProgress -> Completed`. The move
//! into `Completed` happens at most once per playthrough, and only that
//! move writes progress and broadcasts a [`CompletionEvent`]. Completing
//! an already-completed puzzle never writes again.
//!
//! ## Layout Determinism
//!
//! Every layout is generated from a 64-bit seed. The same seed, puzzle,
//! board and mode always yield the same scatter, so a reported layout can
//! be replayed exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod context;
pub mod progress;
pub mod puzzle;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use core::vec2::Vec2;
pub use config::{ConfigError, EngineConfig};
pub use context::{ContextError, GameContext};
pub use progress::{
    CompletionOutcome, CompletionRecord, FileStore, KeyValueStore, MemoryStore,
    PersistenceError, ProgressStore, UserProgress,
};
pub use puzzle::{
    BoardSize, Catalog, CompletionEvent, InteractionMode, Piece, PuzzleDefinition,
    PuzzleSession, SessionError, SessionEvent, SessionState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

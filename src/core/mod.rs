//! Core deterministic primitives.
//!
//! Seeded randomness and pixel-space geometry shared by the layout
//! generator, the placement evaluator and the session controller.

pub mod vec2;
pub mod rng;

// Re-export core types
pub use vec2::Vec2;
pub use rng::{DeterministicRng, derive_layout_seed, fresh_seed};

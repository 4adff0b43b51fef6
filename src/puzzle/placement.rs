//! Placement Evaluator
//!
//! Pure checks for whether pieces sit where they belong.
//!
//! A free (continuous-mode) piece is placed when its position is within
//! the tolerance of its target on both axes, boundaries included. A
//! slotted (discrete-mode) piece is placed only when it occupies its home
//! slot; tolerance does not apply to slots.

use crate::puzzle::layout::{Piece, PiecePosition};

/// Default continuous-mode tolerance, generous enough for small hands.
pub const DEFAULT_TOLERANCE_PX: f32 = 40.0;

/// Is this piece on its target?
#[inline]
pub fn is_placed(piece: &Piece, tolerance_px: f32) -> bool {
    match piece.current {
        PiecePosition::Free(pos) => pos.within(piece.target, tolerance_px),
        PiecePosition::Slot(slot) => slot == piece.home,
    }
}

/// Is every piece on its target?
///
/// Evaluates exactly the same predicate as [`is_placed`] for each piece.
pub fn all_placed(pieces: &[Piece], tolerance_px: f32) -> bool {
    pieces.iter().all(|piece| is_placed(piece, tolerance_px))
}

/// How many pieces are on their targets.
pub fn placed_count(pieces: &[Piece], tolerance_px: f32) -> usize {
    pieces.iter().filter(|piece| is_placed(piece, tolerance_px)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::DeterministicRng;
    use crate::core::vec2::Vec2;
    use crate::puzzle::catalog::fixtures::puzzle;
    use crate::puzzle::layout::{
        generate_layout_with_rng, solved_layout, BoardSize, InteractionMode, Slot,
    };
    use proptest::prelude::*;

    const BOARD: BoardSize = BoardSize::new(300.0, 300.0);
    const T: f32 = DEFAULT_TOLERANCE_PX;

    fn free_piece_at(x: f32, y: f32) -> Piece {
        Piece {
            index: 4,
            home: Slot::new(1, 1),
            target: Vec2::new(100.0, 100.0),
            size: Vec2::new(100.0, 100.0),
            current: PiecePosition::Free(Vec2::new(x, y)),
        }
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        assert!(is_placed(&free_piece_at(100.0 + T, 100.0), T));
        assert!(is_placed(&free_piece_at(100.0 - T, 100.0 + T), T));
        assert!(is_placed(&free_piece_at(100.0 + T, 100.0 - T), T));
    }

    #[test]
    fn test_one_past_tolerance_is_not_placed() {
        assert!(!is_placed(&free_piece_at(100.0 + T + 1.0, 100.0), T));
        assert!(!is_placed(&free_piece_at(100.0, 100.0 - T - 1.0), T));
    }

    #[test]
    fn test_tolerance_is_a_parameter() {
        let piece = free_piece_at(110.0, 100.0);
        assert!(is_placed(&piece, 10.0));
        assert!(!is_placed(&piece, 9.0));
        assert!(!is_placed(&free_piece_at(100.5, 100.0), 0.0));
    }

    #[test]
    fn test_slots_ignore_tolerance() {
        let mut piece = free_piece_at(0.0, 0.0);
        piece.current = PiecePosition::Slot(Slot::new(1, 1));
        assert!(is_placed(&piece, 0.0));

        piece.current = PiecePosition::Slot(Slot::new(1, 2));
        assert!(!is_placed(&piece, 1000.0));
    }

    #[test]
    fn test_solved_layouts_are_all_placed() {
        let p = puzzle("1", 1, 4, true);
        for mode in [InteractionMode::Continuous, InteractionMode::Discrete] {
            let pieces = solved_layout(&p, BOARD, mode).unwrap();
            assert!(all_placed(&pieces, T));
            assert_eq!(placed_count(&pieces, T), 16);
        }
    }

    #[test]
    fn test_one_stray_piece_blocks_completion() {
        let p = puzzle("1", 1, 3, true);
        let mut pieces = solved_layout(&p, BOARD, InteractionMode::Continuous).unwrap();
        pieces[7].current = PiecePosition::Free(Vec2::new(250.0, 0.0));

        assert!(!all_placed(&pieces, T));
        assert_eq!(placed_count(&pieces, T), 8);
    }

    proptest! {
        #[test]
        fn prop_all_placed_matches_each_piece(grid in 1u32..6, seed in any::<u64>(), tol in 0.0f32..120.0) {
            let p = puzzle("1", 1, grid, true);
            let pieces = generate_layout_with_rng(&p, BOARD, InteractionMode::Continuous, &mut DeterministicRng::new(seed)).unwrap();

            let every = pieces.iter().all(|piece| is_placed(piece, tol));
            prop_assert_eq!(all_placed(&pieces, tol), every);
            prop_assert_eq!(placed_count(&pieces, tol) == pieces.len(), every);
        }
    }
}

//! Piece Layout Generator
//!
//! Cuts a board into `N x N` pieces and scatters them. Piece `index` is
//! `row * N + col` of the image slice it shows, and its target is the
//! top-left corner of that slice on the board.
//!
//! Two scatter strategies exist, one per [`InteractionMode`]:
//! - Continuous: each piece is dropped at an independent uniform position
//!   that keeps it fully on the board. Overlap is allowed.
//! - Discrete: the grid slots are permuted with a Fisher-Yates shuffle and
//!   each piece sits in its permuted slot.

use serde::{Serialize, Deserialize};

use crate::config::BoardSizing;
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::puzzle::catalog::PuzzleDefinition;

/// How the player moves pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Drag pieces freely; placement is judged with a pixel tolerance.
    Continuous,
    /// Tap two pieces to swap their grid slots; placement is exact.
    Discrete,
}

/// A grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Row from the top.
    pub row: u32,
    /// Column from the left.
    pub col: u32,
}

impl Slot {
    /// Create a slot.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Slot for a row-major index.
    pub fn from_index(index: usize, grid_size: u32) -> Self {
        let n = grid_size.max(1) as usize;
        Self {
            row: (index / n) as u32,
            col: (index % n) as u32,
        }
    }

    /// Row-major index of this slot.
    pub fn index(self, grid_size: u32) -> usize {
        self.row as usize * grid_size as usize + self.col as usize
    }

    /// Top-left pixel of this slot for the given piece size.
    pub fn origin(self, piece_size: Vec2) -> Vec2 {
        Vec2::new(self.col as f32 * piece_size.x, self.row as f32 * piece_size.y)
    }
}

/// Board dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSize {
    /// Width (pixels).
    pub width: f32,
    /// Height (pixels).
    pub height: f32,
}

impl BoardSize {
    /// Create a board size.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Square board sized for a grid: `grid * px_per_cell`, clamped to
    /// `[min_px, max_px]`.
    pub fn recommended(grid_size: u32, sizing: &BoardSizing) -> Self {
        let edge = (grid_size as f32 * sizing.px_per_cell).clamp(sizing.min_px, sizing.max_px);
        Self::new(edge, edge)
    }

    /// Size of one piece on an `N x N` grid.
    pub fn piece_size(self, grid_size: u32) -> Vec2 {
        let n = grid_size.max(1) as f32;
        Vec2::new(self.width / n, self.height / n)
    }

    fn validate(self) -> Result<(), LayoutError> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(LayoutError::InvalidLayoutRequest(format!(
                "board must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Where a piece currently is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PiecePosition {
    /// Continuous mode: top-left corner in board pixels.
    Free(Vec2),
    /// Discrete mode: occupied grid slot.
    Slot(Slot),
}

/// One puzzle piece in a live session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Which image slice this is (`row * N + col`).
    pub index: usize,
    /// The slot this piece belongs in.
    pub home: Slot,
    /// Top-left pixel of the home slot.
    pub target: Vec2,
    /// Piece width and height (pixels).
    pub size: Vec2,
    /// Current position.
    pub current: PiecePosition,
}

impl Piece {
    /// Top-left pixel the piece should be drawn at.
    pub fn pixel_position(&self) -> Vec2 {
        match self.current {
            PiecePosition::Free(pos) => pos,
            PiecePosition::Slot(slot) => slot.origin(self.size),
        }
    }

    /// Occupied slot, for discrete pieces.
    pub fn current_slot(&self) -> Option<Slot> {
        match self.current {
            PiecePosition::Slot(slot) => Some(slot),
            PiecePosition::Free(_) => None,
        }
    }
}

/// Fractional rectangle of the source image shown by a piece.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageRegion {
    /// Left edge, 0..1.
    pub left: f32,
    /// Top edge, 0..1.
    pub top: f32,
    /// Width, 0..1.
    pub width: f32,
    /// Height, 0..1.
    pub height: f32,
}

/// Source-image rectangle for piece `index` on an `N x N` grid.
pub fn source_region(index: usize, grid_size: u32) -> ImageRegion {
    let n = grid_size.max(1) as f32;
    let slot = Slot::from_index(index, grid_size);
    ImageRegion {
        left: slot.col as f32 / n,
        top: slot.row as f32 / n,
        width: 1.0 / n,
        height: 1.0 / n,
    }
}

/// Generate a scattered layout from a fresh random seed.
pub fn generate_layout(
    puzzle: &PuzzleDefinition,
    board: BoardSize,
    mode: InteractionMode,
) -> Result<Vec<Piece>, LayoutError> {
    let mut rng = DeterministicRng::from_entropy();
    generate_layout_with_rng(puzzle, board, mode, &mut rng)
}

/// Generate a scattered layout, drawing randomness from `rng`.
pub fn generate_layout_with_rng(
    puzzle: &PuzzleDefinition,
    board: BoardSize,
    mode: InteractionMode,
    rng: &mut DeterministicRng,
) -> Result<Vec<Piece>, LayoutError> {
    check_request(puzzle.grid_size, board)?;
    let grid = puzzle.grid_size;
    let piece_size = board.piece_size(grid);

    match mode {
        InteractionMode::Continuous => {
            let max_x = (board.width - piece_size.x).max(0.0);
            let max_y = (board.height - piece_size.y).max(0.0);
            Ok(build_pieces(grid, piece_size, |_| {
                let x = rng.next_f32_range(0.0, max_x);
                let y = rng.next_f32_range(0.0, max_y);
                PiecePosition::Free(Vec2::new(x, y))
            }))
        }
        InteractionMode::Discrete => {
            let mut slots: Vec<usize> = (0..cell_count(grid)).collect();
            rng.shuffle(&mut slots);
            Ok(build_pieces(grid, piece_size, |home| {
                let index = home.index(grid);
                PiecePosition::Slot(Slot::from_index(slots[index], grid))
            }))
        }
    }
}

/// Layout with every piece already on its target (the identity arrangement).
pub fn solved_layout(
    puzzle: &PuzzleDefinition,
    board: BoardSize,
    mode: InteractionMode,
) -> Result<Vec<Piece>, LayoutError> {
    check_request(puzzle.grid_size, board)?;
    let piece_size = board.piece_size(puzzle.grid_size);
    Ok(build_pieces(puzzle.grid_size, piece_size, |home| match mode {
        InteractionMode::Continuous => PiecePosition::Free(home.origin(piece_size)),
        InteractionMode::Discrete => PiecePosition::Slot(home),
    }))
}

fn check_request(grid_size: u32, board: BoardSize) -> Result<(), LayoutError> {
    if grid_size < 1 {
        return Err(LayoutError::InvalidLayoutRequest(format!(
            "grid size must be at least 1, got {grid_size}"
        )));
    }
    board.validate()
}

/// Cells in an `N x N` grid, computed in `usize`.
pub(crate) fn cell_count(grid_size: u32) -> usize {
    let n = grid_size as usize;
    n * n
}

/// Row-major piece construction; `place` chooses each piece's start position.
fn build_pieces<F>(grid_size: u32, piece_size: Vec2, mut place: F) -> Vec<Piece>
where
    F: FnMut(Slot) -> PiecePosition,
{
    let mut pieces = Vec::with_capacity(cell_count(grid_size));
    for row in 0..grid_size {
        for col in 0..grid_size {
            let home = Slot::new(row, col);
            pieces.push(Piece {
                index: home.index(grid_size),
                home,
                target: home.origin(piece_size),
                size: piece_size,
                current: place(home),
            });
        }
    }
    pieces
}

/// Layout errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Caller asked for an impossible board; a programming error.
    #[error("Invalid layout request: {0}")]
    InvalidLayoutRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::catalog::fixtures::puzzle;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const BOARD: BoardSize = BoardSize::new(300.0, 300.0);

    #[test]
    fn test_targets_partition_board() {
        let p = puzzle("1", 1, 3, true);
        let pieces = generate_layout(&p, BOARD, InteractionMode::Continuous).unwrap();

        assert_eq!(pieces.len(), 9);
        assert_eq!(pieces[0].target, Vec2::new(0.0, 0.0));
        assert_eq!(pieces[5].home, Slot::new(1, 2));
        assert_eq!(pieces[5].target, Vec2::new(200.0, 100.0));
        assert_eq!(pieces[8].size, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_continuous_pieces_stay_on_board() {
        let p = puzzle("1", 1, 4, true);
        let board = BoardSize::new(400.0, 320.0);
        let mut rng = DeterministicRng::new(77);
        let pieces = generate_layout_with_rng(&p, board, InteractionMode::Continuous, &mut rng).unwrap();

        for piece in &pieces {
            let PiecePosition::Free(pos) = piece.current else {
                panic!("continuous layout produced a slotted piece");
            };
            assert!(pos.x >= 0.0 && pos.x <= 300.0);
            assert!(pos.y >= 0.0 && pos.y <= 240.0);
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let p = puzzle("1", 1, 3, true);
        let a = generate_layout_with_rng(&p, BOARD, InteractionMode::Discrete, &mut DeterministicRng::new(9)).unwrap();
        let b = generate_layout_with_rng(&p, BOARD, InteractionMode::Discrete, &mut DeterministicRng::new(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_piece_grid() {
        let p = puzzle("1", 1, 1, true);
        let pieces = generate_layout(&p, BOARD, InteractionMode::Discrete).unwrap();
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].current, PiecePosition::Slot(Slot::new(0, 0)));

        // A one-piece board leaves no room to scatter
        let pieces = generate_layout(&p, BOARD, InteractionMode::Continuous).unwrap();
        assert_eq!(pieces[0].current, PiecePosition::Free(Vec2::ZERO));
    }

    #[test]
    fn test_invalid_requests() {
        let p = puzzle("1", 1, 3, true);
        for board in [
            BoardSize::new(0.0, 300.0),
            BoardSize::new(300.0, -1.0),
            BoardSize::new(f32::NAN, 300.0),
            BoardSize::new(300.0, f32::INFINITY),
        ] {
            assert!(matches!(
                generate_layout(&p, board, InteractionMode::Continuous),
                Err(LayoutError::InvalidLayoutRequest(_))
            ));
        }

        let mut zero = puzzle("1", 1, 3, true);
        zero.grid_size = 0;
        assert!(generate_layout(&zero, BOARD, InteractionMode::Discrete).is_err());
    }

    #[test]
    fn test_solved_layout_positions() {
        let p = puzzle("1", 1, 3, true);
        let pieces = solved_layout(&p, BOARD, InteractionMode::Discrete).unwrap();
        assert!(pieces.iter().all(|piece| piece.current_slot() == Some(piece.home)));
        assert_eq!(pieces[4].pixel_position(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_recommended_board_size() {
        let sizing = BoardSizing::default();
        assert_eq!(BoardSize::recommended(2, &sizing), BoardSize::new(300.0, 300.0));
        assert_eq!(BoardSize::recommended(3, &sizing), BoardSize::new(360.0, 360.0));
        assert_eq!(BoardSize::recommended(5, &sizing), BoardSize::new(400.0, 400.0));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_cell_count_of_huge_grid() {
        let grid = 70_000u32;
        assert_eq!(cell_count(grid), 4_900_000_000);
        assert_eq!(Slot::from_index(cell_count(grid) - 1, grid), Slot::new(grid - 1, grid - 1));

        let p = puzzle("big", 1, grid, true);
        assert_eq!(p.piece_count(), cell_count(grid));
    }

    #[test]
    fn test_source_region() {
        let region = source_region(5, 4);
        assert_eq!(region.left, 0.25);
        assert_eq!(region.top, 0.25);
        assert_eq!(region.width, 0.25);
    }

    proptest! {
        #[test]
        fn prop_layout_covers_every_slot_once(grid in 1u32..8, seed in any::<u64>(), discrete in any::<bool>()) {
            let p = puzzle("1", 1, grid, true);
            let mode = if discrete { InteractionMode::Discrete } else { InteractionMode::Continuous };
            let pieces = generate_layout_with_rng(&p, BOARD, mode, &mut DeterministicRng::new(seed)).unwrap();

            let n = (grid * grid) as usize;
            prop_assert_eq!(pieces.len(), n);

            let indices: BTreeSet<usize> = pieces.iter().map(|piece| piece.index).collect();
            prop_assert_eq!(indices.len(), n);

            let homes: BTreeSet<Slot> = pieces.iter().map(|piece| piece.home).collect();
            prop_assert_eq!(homes.len(), n);
            for piece in &pieces {
                prop_assert_eq!(piece.index, piece.home.index(grid));
            }
        }

        #[test]
        fn prop_discrete_slots_are_a_permutation(grid in 1u32..8, seed in any::<u64>()) {
            let p = puzzle("1", 1, grid, true);
            let pieces = generate_layout_with_rng(&p, BOARD, InteractionMode::Discrete, &mut DeterministicRng::new(seed)).unwrap();

            let mut occupied: Vec<usize> = pieces
                .iter()
                .filter_map(|piece| piece.current_slot())
                .map(|slot| slot.index(grid))
                .collect();
            occupied.sort_unstable();
            prop_assert_eq!(occupied, (0..(grid * grid) as usize).collect::<Vec<_>>());
        }
    }
}

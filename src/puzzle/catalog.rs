//! Puzzle Catalog
//!
//! Static, ordered, read-only list of puzzle definitions. Loaded once at
//! process start; acquiring the list (bundled JSON, network) is the
//! caller's concern.

use std::collections::{BTreeMap, BTreeSet};
use serde::{Serialize, Deserialize};

/// Informational difficulty tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Easy
    #[default]
    Easy,
    /// Medium
    Medium,
    /// Hard
    Hard,
}

/// One puzzle in the catalog.
///
/// `sequence` is the explicit unlock ordering. It is decoupled from `id`
/// so display ids can be anything.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDefinition {
    /// Stable identifier, persisted in progress.
    pub id: String,
    /// Unlock ordering.
    pub sequence: u32,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Long-form description shown with the puzzle.
    #[serde(default)]
    pub description: String,
    /// The board is split into `grid_size x grid_size` pieces.
    pub grid_size: u32,
    /// Source image (URL or asset handle).
    pub image_ref: String,
    /// Media shown once the puzzle is completed.
    #[serde(default)]
    pub completion_media: String,
    /// Quote text.
    #[serde(default)]
    pub narrative_text: String,
    /// Quote attribution.
    #[serde(default)]
    pub attribution_text: String,
    /// Journal entry title unlocked on completion.
    #[serde(default)]
    pub journal_title: String,
    /// Journal entry body unlocked on completion.
    #[serde(default)]
    pub journal_body: String,
    /// Difficulty tag.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Playable without any completions.
    #[serde(default)]
    pub unlocked_by_default: bool,
}

impl PuzzleDefinition {
    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        crate::puzzle::layout::cell_count(self.grid_size)
    }
}

/// Wire form of a catalog entry, where `sequence` may be omitted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PuzzleRecord {
    id: String,
    sequence: Option<u32>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    grid_size: u32,
    image_ref: String,
    #[serde(default)]
    completion_media: String,
    #[serde(default)]
    narrative_text: String,
    #[serde(default)]
    attribution_text: String,
    #[serde(default)]
    journal_title: String,
    #[serde(default)]
    journal_body: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    unlocked_by_default: bool,
}

impl PuzzleRecord {
    /// Explicit sequence, else the id parsed as an integer.
    fn known_sequence(&self) -> Option<u32> {
        self.sequence.or_else(|| self.id.trim().parse::<u32>().ok())
    }

    /// Resolve the unlock sequence. Records with neither an explicit
    /// sequence nor a numeric id are placed after every known sequence,
    /// at `base + 1-based position`.
    fn into_definition(self, position: usize, base: u32) -> PuzzleDefinition {
        let sequence = self
            .known_sequence()
            .unwrap_or_else(|| base.saturating_add(position as u32 + 1));

        PuzzleDefinition {
            id: self.id,
            sequence,
            title: self.title,
            description: self.description,
            grid_size: self.grid_size,
            image_ref: self.image_ref,
            completion_media: self.completion_media,
            narrative_text: self.narrative_text,
            attribution_text: self.attribution_text,
            journal_title: self.journal_title,
            journal_body: self.journal_body,
            difficulty: self.difficulty,
            unlocked_by_default: self.unlocked_by_default,
        }
    }
}

/// Ordered puzzle catalog with id lookup.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    puzzles: Vec<PuzzleDefinition>,
    by_id: BTreeMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, validating every entry.
    pub fn new(puzzles: Vec<PuzzleDefinition>) -> Result<Self, CatalogError> {
        let mut by_id = BTreeMap::new();
        let mut sequences = BTreeSet::new();

        for (index, puzzle) in puzzles.iter().enumerate() {
            if puzzle.grid_size < 1 {
                return Err(CatalogError::InvalidGridSize {
                    id: puzzle.id.clone(),
                    grid_size: puzzle.grid_size,
                });
            }
            if by_id.insert(puzzle.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateId(puzzle.id.clone()));
            }
            if !sequences.insert(puzzle.sequence) {
                return Err(CatalogError::DuplicateSequence(puzzle.sequence));
            }
        }

        Ok(Self { puzzles, by_id })
    }

    /// Parse a JSON array of puzzle records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<PuzzleRecord> = serde_json::from_str(json)?;
        let base = records
            .iter()
            .filter_map(PuzzleRecord::known_sequence)
            .max()
            .unwrap_or(0);
        let puzzles = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| record.into_definition(position, base))
            .collect();
        Self::new(puzzles)
    }

    /// Look up a puzzle by id.
    pub fn get(&self, id: &str) -> Result<&PuzzleDefinition, CatalogError> {
        self.by_id
            .get(id)
            .map(|&index| &self.puzzles[index])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Catalog position of a puzzle.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Check membership.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, PuzzleDefinition> {
        self.puzzles.iter()
    }

    /// Number of puzzles.
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a PuzzleDefinition;
    type IntoIter = std::slice::Iter<'a, PuzzleDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Catalog errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Requested puzzle id is not in the catalog.
    #[error("Puzzle not found: {0}")]
    NotFound(String),

    /// Grid size below 1.
    #[error("Puzzle {id} has invalid grid size {grid_size}")]
    InvalidGridSize {
        /// Offending puzzle.
        id: String,
        /// Its grid size.
        grid_size: u32,
    },

    /// Two entries share an id.
    #[error("Duplicate puzzle id: {0}")]
    DuplicateId(String),

    /// Two entries share an unlock sequence.
    #[error("Duplicate puzzle sequence: {0}")]
    DuplicateSequence(u32),

    /// Catalog JSON is malformed.
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A definition with sensible display defaults.
    pub fn puzzle(id: &str, sequence: u32, grid_size: u32, unlocked_by_default: bool) -> PuzzleDefinition {
        PuzzleDefinition {
            id: id.to_string(),
            sequence,
            title: format!("Puzzle {id}"),
            description: String::new(),
            grid_size,
            image_ref: format!("puzzles/{id}.png"),
            completion_media: format!("puzzles/{id}.gif"),
            narrative_text: String::new(),
            attribution_text: String::new(),
            journal_title: format!("Entry {id}"),
            journal_body: format!("Body {id}"),
            difficulty: Difficulty::Easy,
            unlocked_by_default,
        }
    }

    /// Puzzles "1".."=count", only "1" unlocked by default.
    pub fn numbered_catalog(count: u32) -> Catalog {
        let puzzles = (1..=count)
            .map(|n| puzzle(&n.to_string(), n, 3, n == 1))
            .collect();
        Catalog::new(puzzles).unwrap()
    }
}

//! Engine Configuration
//!
//! Tunables for placement, unlocking, persistence and board sizing.
//! Every field has a default, so a config file only needs the keys it
//! overrides.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::puzzle::placement::DEFAULT_TOLERANCE_PX;
use crate::progress::DEFAULT_PROGRESS_KEY;

/// Completing puzzle `k` unlocks every puzzle with sequence `<= k + UNLOCK_WINDOW`.
pub const DEFAULT_UNLOCK_WINDOW: u32 = 3;

/// Board sizing rule for square boards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardSizing {
    /// Smallest board edge (pixels).
    pub min_px: f32,
    /// Largest board edge (pixels).
    pub max_px: f32,
    /// Edge length contributed by each grid cell before clamping.
    pub px_per_cell: f32,
}

impl Default for BoardSizing {
    fn default() -> Self {
        Self {
            min_px: 300.0,
            max_px: 400.0,
            px_per_cell: 120.0,
        }
    }
}

/// Configuration for the puzzle engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Continuous-mode placement tolerance (pixels, per axis).
    pub placement_tolerance_px: f32,
    /// Snap a continuous-mode piece onto its target once it lands within tolerance.
    pub snap_to_target: bool,
    /// How far past a completed puzzle's sequence the unlock reaches.
    pub unlock_window: u32,
    /// Key under which progress is stored in the key-value backend.
    pub progress_key: String,
    /// Board sizing for [`BoardSize::recommended`](crate::puzzle::layout::BoardSize::recommended).
    pub board: BoardSizing,
    /// Capacity of the completion broadcast channel.
    pub completion_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement_tolerance_px: DEFAULT_TOLERANCE_PX,
            snap_to_target: true,
            unlock_window: DEFAULT_UNLOCK_WINDOW,
            progress_key: DEFAULT_PROGRESS_KEY.to_string(),
            board: BoardSizing::default(),
            completion_channel_capacity: 16,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&raw)
    }

    /// Reject values that would make placement or sizing meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.placement_tolerance_px.is_finite() || self.placement_tolerance_px < 0.0 {
            return Err(ConfigError::Invalid("placementTolerancePx must be a non-negative number".into()));
        }
        let board = &self.board;
        if !(board.min_px > 0.0 && board.max_px >= board.min_px && board.px_per_cell > 0.0) {
            return Err(ConfigError::Invalid("board sizing must be positive with minPx <= maxPx".into()));
        }
        if self.progress_key.trim().is_empty() {
            return Err(ConfigError::Invalid("progressKey must not be empty".into()));
        }
        if self.completion_channel_capacity == 0 {
            return Err(ConfigError::Invalid("completionChannelCapacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.placement_tolerance_px, 40.0);
        assert_eq!(config.unlock_window, 3);
        assert_eq!(config.progress_key, "esoterica-progress");
        assert!(config.snap_to_target);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "placementTolerancePx": 25, "board": { "maxPx": 350 } }"#)
            .unwrap();
        assert_eq!(config.placement_tolerance_px, 25.0);
        assert_eq!(config.board.max_px, 350.0);
        assert_eq!(config.board.min_px, 300.0);
        assert_eq!(config.unlock_window, 3);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let result = EngineConfig::from_json_str(r#"{ "placementTolerancePx": -1 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let result = EngineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        tokio::fs::write(&path, r#"{ "unlockWindow": 5 }"#).await.unwrap();

        let config = EngineConfig::from_file(&path).await.unwrap();
        assert_eq!(config.unlock_window, 5);
    }
}

//! Core configuration consumed at construction.

use crate::error::ConfigError;

pub const DEFAULT_ROWS: usize = 5;
pub const DEFAULT_COLS: usize = 5;
pub const DEFAULT_MERGE_THRESHOLD: u32 = 50;
/// Longest side a grid may have; keeps `rows * cols` and the drawn board in range.
pub const MAX_SIDE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Points at which a stone turns into a merged stone.
    pub merge_threshold: u32,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.cols == 0 {
            return Err(ConfigError::ZeroCols);
        }
        if self.rows > MAX_SIDE
            || self.cols > MAX_SIDE
            || self.rows.checked_mul(self.cols).is_none()
        {
            return Err(ConfigError::TooLarge {
                rows: self.rows,
                cols: self.cols,
                max: MAX_SIDE,
            });
        }
        if self.merge_threshold <= 1 {
            return Err(ConfigError::ThresholdTooLow(self.merge_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_degenerate() {
        let base = GameConfig::default();
        assert_eq!(
            GameConfig { rows: 0, ..base.clone() }.validate(),
            Err(ConfigError::ZeroRows)
        );
        assert_eq!(
            GameConfig { cols: 0, ..base.clone() }.validate(),
            Err(ConfigError::ZeroCols)
        );
        assert_eq!(
            GameConfig {
                merge_threshold: 1,
                ..base
            }
            .validate(),
            Err(ConfigError::ThresholdTooLow(1))
        );
    }

    #[test]
    fn test_rejects_oversized_grids() {
        let huge = GameConfig {
            rows: 1 << 33,
            cols: 1 << 33,
            ..GameConfig::default()
        };
        assert!(matches!(huge.validate(), Err(ConfigError::TooLarge { .. })));

        let wide = GameConfig {
            cols: MAX_SIDE + 1,
            ..GameConfig::default()
        };
        assert_eq!(
            wide.validate(),
            Err(ConfigError::TooLarge {
                rows: DEFAULT_ROWS,
                cols: MAX_SIDE + 1,
                max: MAX_SIDE,
            })
        );

        let edge = GameConfig {
            rows: MAX_SIDE,
            cols: MAX_SIDE,
            ..GameConfig::default()
        };
        assert_eq!(edge.validate(), Ok(()));
    }
}

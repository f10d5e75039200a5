use std::time::Duration;

use crate::error::GameError;
use crate::game::piece::CELL;

// ============================================================================
// Defaults
// ============================================================================

/// Board width in grid units (10 logical columns).
pub const DEFAULT_BOARD_WIDTH: usize = 20;
/// Board depth in grid units (18 logical rows).
pub const DEFAULT_BOARD_DEPTH: usize = 36;
pub const DEFAULT_TICK_MS: u64 = 500;
pub const POINTS_PER_LINE: u32 = 20;

/// The widest and tallest any piece gets (the I piece lying down or standing up).
const MIN_EXTENT: usize = 4 * CELL as usize;
/// Keeps every anchor, plus a piece extent and a one-row step, inside `i16`,
/// and the rendered board inside a `u16` terminal rectangle.
pub const MAX_EXTENT: usize = 2048;

// ============================================================================
// GameConfig
// ============================================================================

/// Board geometry and pacing for a session.
///
/// All board dimensions are in grid units; one logical cell spans a
/// `CELL x CELL` block of units, so both dimensions must be even.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub board_width: usize,
    pub board_depth: usize,
    pub tick_interval: Duration,
    pub points_per_line: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: DEFAULT_BOARD_WIDTH,
            board_depth: DEFAULT_BOARD_DEPTH,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            points_per_line: POINTS_PER_LINE,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !extent_is_valid(self.board_width) {
            return Err(GameError::InvalidWidth {
                width: self.board_width,
                min: MIN_EXTENT,
                max: MAX_EXTENT,
            });
        }
        if !extent_is_valid(self.board_depth) {
            return Err(GameError::InvalidDepth {
                depth: self.board_depth,
                min: MIN_EXTENT,
                max: MAX_EXTENT,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(GameError::ZeroTickInterval);
        }
        Ok(())
    }

    /// Top-center anchor where new pieces appear. Widths past `i16` range
    /// never pass `validate`; they saturate here rather than wrap.
    pub fn spawn_position(&self) -> (i16, i16) {
        let x = (self.board_width / 2).saturating_sub(CELL as usize);
        let x = i16::try_from(x).unwrap_or(i16::MAX);
        (x - x % CELL, 0)
    }

    pub fn logical_columns(&self) -> usize {
        self.board_width / CELL as usize
    }

    pub fn logical_rows(&self) -> usize {
        self.board_depth / CELL as usize
    }
}

fn extent_is_valid(extent: usize) -> bool {
    extent % CELL as usize == 0 && (MIN_EXTENT..=MAX_EXTENT).contains(&extent)
}

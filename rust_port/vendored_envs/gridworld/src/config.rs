use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::wrappers::BearingMode;

/// Engine configuration. Missing fields fall back to the defaults below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub max_steps: u32,
    /// Replace the generator's start position with a uniformly sampled empty interior cell.
    pub random_start: bool,
    pub bearing_mode: BearingMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { width: 8, height: 8, max_steps: 100, random_start: false, bearing_mode: BearingMode::Angle }
    }
}

impl GridConfig {
    pub fn new(width: usize, height: usize, max_steps: u32) -> Self {
        Self { width, height, max_steps, ..Self::default() }
    }

    pub fn with_random_start(mut self, random_start: bool) -> Self {
        self.random_start = random_start;
        self
    }

    pub fn with_bearing_mode(mut self, mode: BearingMode) -> Self {
        self.bearing_mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::InvalidConfig(format!("grid must be non-empty, got {}x{}", self.width, self.height)));
        }
        if i32::try_from(self.width).is_err() || i32::try_from(self.height).is_err() {
            return Err(GridError::InvalidConfig("grid dimensions exceed i32 range".into()));
        }
        if self.max_steps == 0 {
            return Err(GridError::InvalidConfig("max_steps must be positive".into()));
        }
        Ok(())
    }
}

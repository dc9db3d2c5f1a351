use crate::engine::GameConfig;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Tunables of the runner. Any field missing from a JSON config keeps the
/// default below.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// side of a square ground tile
    pub platform_width: f32,
    /// vertical distance between two ground height levels
    pub platform_spacer: f32,
    /// pixels per tick the world scrolls by at the start
    pub start_speed: u32,
    pub max_speed: u32,
    pub gravity: f32,
    pub jump_velocity: f32,
    /// ticks a held jump key keeps pushing upwards
    pub jump_hold_ticks: u32,
    pub walk_cadence: u32,
    /// flat grass under the player when a run starts
    pub start_ground_tiles: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            platform_width: 32.0,
            platform_spacer: 64.0,
            start_speed: 6,
            max_speed: 15,
            gravity: 1.0,
            jump_velocity: -10.0,
            jump_hold_ticks: 12,
            walk_cadence: 4,
            start_ground_tiles: 30,
        }
    }
}

impl RunnerConfig {
    /// ticks between two spawn steps at `speed`, one tile width of scrolling
    pub fn spawn_period(&self, speed: u32) -> u32 {
        if speed == 0 {
            return 1;
        }
        ((self.platform_width / speed as f32).floor() as u32).max(1)
    }
}

impl GameConfig for RunnerConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.platform_width > 0.0,
            "platform_width must be positive, got {}",
            self.platform_width
        );
        ensure!(self.start_speed >= 1, "start_speed must be at least 1");
        ensure!(
            self.max_speed >= self.start_speed,
            "max_speed {} is below start_speed {}",
            self.max_speed,
            self.start_speed
        );
        Ok(())
    }
}

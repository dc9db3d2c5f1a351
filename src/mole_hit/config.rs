use crate::engine::GameConfig;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Tunables of the mole game. Any field missing from a JSON config keeps the
/// default below.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MoleHitConfig {
    /// redraw / update tick in milliseconds
    pub tick_ms: f32,
    /// moles pop up every this many milliseconds of play
    pub spawn_interval_ms: f32,
    /// length of one step of the 3, 2, 1, start countdown
    pub countdown_step_ms: f32,
    /// playing ticks before the level is judged
    pub level_ticks: u32,
    pub base_require_score: u32,
    /// added to the requirement for every cleared level
    pub require_score_step: u32,
    /// pixels a mole rises or sinks per tick
    pub rise_speed: f32,
    /// ticks a hit mole stays on screen
    pub dead_ticks: u32,
    /// ticks a score glyph stays on screen
    pub popup_ticks: u32,
    /// ticks per animation frame
    pub frame_cadence: u32,
}

impl Default for MoleHitConfig {
    fn default() -> Self {
        MoleHitConfig {
            tick_ms: 30.0,
            spawn_interval_ms: 2000.0,
            countdown_step_ms: 1000.0,
            level_ticks: 2100,
            base_require_score: 2000,
            require_score_step: 400,
            rise_speed: 3.0,
            dead_ticks: 56,
            popup_ticks: 20,
            frame_cadence: 5,
        }
    }
}

impl GameConfig for MoleHitConfig {
    fn validate(&self) -> Result<()> {
        ensure!(self.tick_ms > 0.0, "tick_ms must be positive, got {}", self.tick_ms);
        ensure!(
            self.spawn_interval_ms > 0.0,
            "spawn_interval_ms must be positive, got {}",
            self.spawn_interval_ms
        );
        ensure!(
            self.countdown_step_ms > 0.0,
            "countdown_step_ms must be positive, got {}",
            self.countdown_step_ms
        );
        Ok(())
    }
}

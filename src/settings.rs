//! Simulation tuning
//!
//! Everything the core reads from the tick/clock source and the level
//! tuning tables. Loaded from JSON; any failure falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Data-driven game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Clock ===
    /// Fixed tick rate (ticks per second)
    pub tick_rate: u32,

    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Player ===
    /// Horizontal speed while a direction is held
    pub player_speed: f32,
    /// Gravity constant (also scales the jump impulse)
    pub gravity: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub player_max_health: u32,
    /// Invincibility after taking damage (seconds)
    pub player_invincibility_secs: f32,

    // === Pickups ===
    pub collectible_points: u64,

    // === Boss ===
    pub boss_invincibility_secs: f32,
    pub boss_knockback: f32,
    pub stomp_tolerance: f32,

    // === World ===
    /// Distance below the viewport at which the player is lost
    pub fall_out_margin: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,

            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,

            player_speed: PLAYER_VEL,
            gravity: GRAVITY,
            player_width: PLAYER_SIZE,
            player_height: PLAYER_SIZE,
            player_max_health: PLAYER_MAX_HEALTH,
            player_invincibility_secs: PLAYER_INVINCIBILITY_SECS,

            collectible_points: POINTS_PER_COLLECTIBLE,

            boss_invincibility_secs: BOSS_INVINCIBILITY_SECS,
            boss_knockback: BOSS_KNOCKBACK,
            stomp_tolerance: STOMP_TOLERANCE,

            fall_out_margin: FALL_OUT_MARGIN,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, falling back to defaults on error
    pub fn load_from_str(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => {
                log::info!("Loaded settings (tick rate {})", settings.tick_rate);
                settings.sanitized()
            }
            Err(e) => {
                log::warn!("Invalid settings JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Read settings from a JSON file, falling back to defaults on error
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Self::load_from_str(&json),
            Err(e) => {
                log::warn!("Could not read settings at {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Clamp values that would break the tick math
    fn sanitized(mut self) -> Self {
        if self.tick_rate == 0 {
            log::warn!("tick_rate must be positive, using {TICK_RATE}");
            self.tick_rate = TICK_RATE;
        }
        self.player_max_health = self.player_max_health.max(1);
        self
    }

    /// Player invincibility window in ticks (120 at 60 Hz)
    pub fn player_invincibility_ticks(&self) -> u32 {
        (self.player_invincibility_secs * self.tick_rate as f32) as u32
    }

    /// Boss invincibility window in ticks (30 at 60 Hz)
    pub fn boss_invincibility_ticks(&self) -> u32 {
        (self.boss_invincibility_secs * self.tick_rate as f32) as u32
    }

    /// Vertical velocity set by a jump or a stomp bounce
    pub fn jump_velocity(&self) -> f32 {
        -self.gravity * JUMP_IMPULSE
    }

    /// Player y beyond which the fall is fatal
    pub fn fall_out_y(&self) -> f32 {
        self.viewport_height + self.fall_out_margin
    }
}

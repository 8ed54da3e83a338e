//! Uga-Buga Platformer - simulation core for a 2D side-scroller
//!
//! Core modules:
//! - `sim`: Deterministic fixed-tick simulation (physics, collisions, boss, session)
//! - `settings`: Data-driven tuning loaded from JSON
//! - `flow`: Screen flow between title, level select, levels and results

pub mod flow;
pub mod settings;
pub mod sim;

pub use flow::{NavChoice, Screen};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Viewport dimensions
    pub const VIEWPORT_WIDTH: f32 = 1000.0;
    pub const VIEWPORT_HEIGHT: f32 = 800.0;

    /// Terrain tile edge length
    pub const BLOCK_SIZE: f32 = 96.0;

    /// Player defaults
    pub const PLAYER_VEL: f32 = 5.0;
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const PLAYER_MAX_HEALTH: u32 = 5;
    /// Invincibility after taking damage (seconds)
    pub const PLAYER_INVINCIBILITY_SECS: f32 = 2.0;
    /// Ticks per animation frame for the player sprite
    pub const PLAYER_ANIMATION_DELAY: u32 = 3;

    /// Extra vertical acceleration per tick is capped at this
    pub const GRAVITY: f32 = 1.0;
    /// Jump impulse in units of gravity
    pub const JUMP_IMPULSE: f32 = 8.0;
    /// Ground jump + one air jump
    pub const MAX_JUMPS: u32 = 2;

    /// Points awarded per collectible
    pub const POINTS_PER_COLLECTIBLE: u64 = 10;
    pub const COLLECTIBLE_SIZE: f32 = 96.0;

    /// Hazard footprints
    pub const FIRE_WIDTH: f32 = 32.0;
    pub const FIRE_HEIGHT: f32 = 64.0;

    /// Checkpoint footprint (64px frames scaled 2x)
    pub const CHECKPOINT_SIZE: f32 = 128.0;

    /// Rock Head boss (42px frames scaled 3x)
    pub const BOSS_SIZE: f32 = 126.0;
    pub const BOSS_MAX_HEALTH: u32 = 5;
    pub const BOSS_PATROL_SPEED: f32 = 1.5;
    pub const BOSS_INVINCIBILITY_SECS: f32 = 0.5;
    pub const BOSS_ANIMATION_DELAY: u32 = 5;
    /// Player bottom may sit this far below the boss top and still stomp
    pub const STOMP_TOLERANCE: f32 = 10.0;
    /// Horizontal displacement applied to the player on boss contact
    pub const BOSS_KNOCKBACK: f32 = 15.0;

    /// Falling this far below the viewport is fatal
    pub const FALL_OUT_MARGIN: f32 = 100.0;
}

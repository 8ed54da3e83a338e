//! The player character
//!
//! Health, score, jump bookkeeping, invincibility and the respawn snapshot.
//! Motion is applied by `physics::integrate` and corrected by the collision
//! resolver; this module only owns the state transitions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Shape;
use super::mask::Mask;
use super::rect::Rect;
use crate::consts::*;
use crate::settings::Settings;

/// Facing direction (selects mirrored sprites)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Left,
    Right,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

/// Sprite sheet chosen for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAnimation {
    Idle,
    Run,
    Jump,
    DoubleJump,
    Fall,
    Hit,
}

impl PlayerAnimation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerAnimation::Idle => "idle",
            PlayerAnimation::Run => "run",
            PlayerAnimation::Jump => "jump",
            PlayerAnimation::DoubleJump => "double_jump",
            PlayerAnimation::Fall => "fall",
            PlayerAnimation::Hit => "hit",
        }
    }
}

/// Where (and with how much health) the player comes back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnPoint {
    pub pos: Vec2,
    pub health: u32,
}

/// The player-controlled character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub vel: Vec2,
    pub facing: Facing,
    /// Invariant: `health <= max_health`
    pub health: u32,
    pub max_health: u32,
    pub score: u64,
    /// Jumps since last ground contact (at most `MAX_JUMPS`)
    pub jump_count: u32,
    /// Ticks since last ground contact or first jump (drives gravity ramp)
    pub fall_count: u32,
    /// Invincible after taking damage
    pub hit: bool,
    pub hit_count: u32,
    pub animation_count: u32,
    pub respawn: RespawnPoint,
    /// Silhouette used for every collision test
    pub mask: Mask,
}

impl Player {
    pub fn new(pos: Vec2, width: f32, height: f32, max_health: u32) -> Self {
        let rect = Rect::new(pos.x, pos.y, width, height);
        Self {
            rect,
            vel: Vec2::ZERO,
            facing: Facing::Left,
            health: max_health,
            max_health,
            score: 0,
            jump_count: 0,
            fall_count: 0,
            hit: false,
            hit_count: 0,
            animation_count: 0,
            respawn: RespawnPoint {
                pos,
                health: max_health,
            },
            mask: Mask::solid_for(rect.size),
        }
    }

    pub fn from_settings(pos: Vec2, settings: &Settings) -> Self {
        Self::new(
            pos,
            settings.player_width,
            settings.player_height,
            settings.player_max_health,
        )
    }

    /// Jump (or double jump); refused once both jumps are spent
    pub fn jump(&mut self, jump_velocity: f32) -> bool {
        if self.jump_count >= MAX_JUMPS {
            return false;
        }
        self.vel.y = jump_velocity;
        self.animation_count = 0;
        self.jump_count += 1;
        if self.jump_count == 1 {
            self.fall_count = 0;
        }
        true
    }

    pub fn shape(&self) -> Shape<'_> {
        Shape {
            rect: self.rect,
            mask: &self.mask,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.rect.translate(delta);
    }

    pub fn move_left(&mut self, speed: f32) {
        self.vel.x = -speed;
        if self.facing != Facing::Left {
            self.facing = Facing::Left;
            self.animation_count = 0;
        }
    }

    pub fn move_right(&mut self, speed: f32) {
        self.vel.x = speed;
        if self.facing != Facing::Right {
            self.facing = Facing::Right;
            self.animation_count = 0;
        }
    }

    /// Take one point of damage unless invincible; returns whether it landed
    pub fn make_hit(&mut self) -> bool {
        if self.hit {
            return false;
        }
        self.hit = true;
        self.hit_count = 0;
        self.health = self.health.saturating_sub(1);
        log::debug!("Player hit, health {}/{}", self.health, self.max_health);
        true
    }

    pub fn heal(&mut self) {
        self.health = (self.health + 1).min(self.max_health);
    }

    pub fn add_score(&mut self, points: u64) {
        self.score += points;
    }

    /// Ground contact
    pub fn landed(&mut self) {
        self.fall_count = 0;
        self.vel.y = 0.0;
        self.jump_count = 0;
    }

    /// Ceiling contact: vertical velocity is inverted, not zeroed
    pub fn hit_head(&mut self) {
        self.vel.y = -self.vel.y;
    }

    /// Record the current health and `pos` as the respawn snapshot
    pub fn set_respawn(&mut self, pos: Vec2) {
        self.respawn = RespawnPoint {
            pos,
            health: self.health,
        };
    }

    /// Return to the respawn snapshot
    pub fn respawn(&mut self) {
        self.rect.pos = self.respawn.pos;
        self.health = self.respawn.health.min(self.max_health);
        self.vel = Vec2::ZERO;
        self.fall_count = 0;
        self.jump_count = 0;
        self.hit = false;
        self.hit_count = 0;
        log::info!(
            "Respawned at ({}, {}) with {} health",
            self.respawn.pos.x,
            self.respawn.pos.y,
            self.health
        );
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Sprite selection from velocity, hit state and jump count
    pub fn animation(&self) -> PlayerAnimation {
        if self.hit && (self.hit_count / 5) % 2 == 0 {
            PlayerAnimation::Hit
        } else if self.vel.y < 0.0 {
            match self.jump_count {
                1 => PlayerAnimation::Jump,
                2 => PlayerAnimation::DoubleJump,
                // Rising without a jump (stomp bounce): idle sheet
                _ => PlayerAnimation::Idle,
            }
        } else if self.vel.y > GRAVITY * 2.0 {
            PlayerAnimation::Fall
        } else if self.vel.x != 0.0 {
            PlayerAnimation::Run
        } else {
            PlayerAnimation::Idle
        }
    }

    /// Sheet name including facing, e.g. `run_right`
    pub fn sprite_key(&self) -> String {
        format!("{}_{}", self.animation().as_str(), self.facing.as_str())
    }

    /// Frame within a sheet of `frame_count` frames
    pub fn frame_index(&self, frame_count: usize) -> usize {
        if frame_count == 0 {
            return 0;
        }
        (self.animation_count / PLAYER_ANIMATION_DELAY) as usize % frame_count
    }

    /// Drawn this tick (blinks while invincible)
    pub fn is_flash_visible(&self) -> bool {
        !self.hit || (self.hit_count / 5) % 2 == 0
    }
}

//! Rock Head boss encounter
//!
//! A patrolling block that can only be damaged by stomping on it. Side and
//! bottom contact hurts the player instead. The boss has its own
//! invincibility window, independent of the player's.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{AdvanceContext, Entity};
use super::mask::Mask;
use super::rect::Rect;
use crate::consts::*;

/// Side of the boss that was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSide {
    Top,
    Left,
    Right,
    Bottom,
}

/// Boss animation states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BossAnimation {
    #[default]
    Idle,
    Blink,
    TopHit,
    LeftHit,
    RightHit,
    BottomHit,
}

impl BossAnimation {
    pub fn for_hit(side: HitSide) -> Self {
        match side {
            HitSide::Top => BossAnimation::TopHit,
            HitSide::Left => BossAnimation::LeftHit,
            HitSide::Right => BossAnimation::RightHit,
            HitSide::Bottom => BossAnimation::BottomHit,
        }
    }

    pub fn frame_count(&self) -> u32 {
        match self {
            BossAnimation::Idle => 1,
            _ => 4,
        }
    }

    /// Everything but idle plays once and returns to idle
    pub fn is_one_shot(&self) -> bool {
        *self != BossAnimation::Idle
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BossAnimation::Idle => "idle",
            BossAnimation::Blink => "blink",
            BossAnimation::TopHit => "top_hit",
            BossAnimation::LeftHit => "left_hit",
            BossAnimation::RightHit => "right_hit",
            BossAnimation::BottomHit => "bottom_hit",
        }
    }
}

/// The Rock Head boss
#[derive(Debug, Clone)]
pub struct Boss {
    pub id: u32,
    pub rect: Rect,
    /// Horizontal patrol speed (sign is direction)
    pub vel_x: f32,
    /// Left patrol bound
    pub start_x: f32,
    pub patrol_distance: f32,
    pub health: u32,
    pub max_health: u32,
    /// Invincible after taking a hit
    pub hit: bool,
    pub hit_count: u32,
    /// Invincibility window in ticks
    pub invincibility_ticks: u32,
    pub animation: BossAnimation,
    pub animation_count: u32,
    /// Cleared for good once defeated
    pub visible: bool,
    mask: Mask,
}

impl Boss {
    pub fn new(
        id: u32,
        pos: Vec2,
        start_x: f32,
        patrol_distance: f32,
        invincibility_ticks: u32,
    ) -> Self {
        let rect = Rect::square(pos.x, pos.y, BOSS_SIZE);
        Self {
            id,
            rect,
            vel_x: BOSS_PATROL_SPEED,
            start_x,
            patrol_distance,
            health: BOSS_MAX_HEALTH,
            max_health: BOSS_MAX_HEALTH,
            hit: false,
            hit_count: 0,
            invincibility_ticks,
            animation: BossAnimation::Idle,
            animation_count: 0,
            visible: true,
            mask: Mask::solid_for(rect.size),
        }
    }

    /// Switch animation, restarting the counter only on an actual change
    pub fn set_animation(&mut self, animation: BossAnimation) {
        if animation != self.animation {
            self.animation = animation;
            self.animation_count = 0;
        }
    }

    /// Register a hit; rejected while invincible
    pub fn take_hit(&mut self, side: HitSide) -> bool {
        if self.hit {
            return false;
        }
        self.health = self.health.saturating_sub(1);
        self.hit = true;
        self.hit_count = 0;
        self.set_animation(BossAnimation::for_hit(side));
        log::debug!("Boss hit from {:?}, health {}", side, self.health);
        true
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Collides, moves and renders
    pub fn is_active(&self) -> bool {
        self.visible
    }

    /// Drawn this tick (blinks while invincible)
    pub fn is_flash_visible(&self) -> bool {
        self.visible && (!self.hit || (self.hit_count / 5) % 2 == 0)
    }

    /// Fraction of health left, for the HUD bar
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    pub fn frame_index(&self) -> u32 {
        (self.animation_count / BOSS_ANIMATION_DELAY) % self.animation.frame_count()
    }

    fn patrol(&mut self) {
        self.rect.pos.x += self.vel_x;
        let x = self.rect.left();
        if x >= self.start_x + self.patrol_distance || x <= self.start_x {
            self.vel_x = -self.vel_x;
        }
    }
}

impl Entity for Boss {
    fn id(&self) -> u32 {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.mask
    }

    fn animation_tag(&self) -> &'static str {
        self.animation.as_str()
    }

    fn advance(&mut self, ctx: &mut AdvanceContext<'_>) {
        if !self.visible {
            return;
        }

        self.patrol();

        if self.hit {
            self.hit_count += 1;
            if self.hit_count > self.invincibility_ticks {
                self.hit = false;
                self.hit_count = 0;
                self.set_animation(BossAnimation::Idle);
            }
        }

        // Roughly one blink every five seconds while idle
        let blink_odds = ctx.tick_rate.max(1) * 5;
        if self.animation == BossAnimation::Idle && ctx.rng.random_range(1..=blink_odds) == 1 {
            self.set_animation(BossAnimation::Blink);
        }

        self.animation_count += 1;
        if self.animation.is_one_shot()
            && self.animation_count / BOSS_ANIMATION_DELAY >= self.animation.frame_count()
        {
            self.set_animation(BossAnimation::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn boss() -> Boss {
        Boss::new(1, Vec2::new(1152.0, 578.0), 1008.0, 288.0, 30)
    }

    #[test]
    fn test_take_hit_rejected_while_invincible() {
        let mut b = boss();
        assert!(b.take_hit(HitSide::Top));
        assert_eq!(b.health, 4);
        assert_eq!(b.animation, BossAnimation::TopHit);
        assert!(!b.take_hit(HitSide::Left));
        assert_eq!(b.health, 4);
        assert_eq!(b.animation, BossAnimation::TopHit);
    }

    #[test]
    fn test_patrol_reverses_at_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ctx = AdvanceContext {
            rng: &mut rng,
            tick_rate: 60,
        };
        let mut b = boss();
        let mut min_x = f32::MAX;
        let mut max_x = f32::MIN;
        for _ in 0..1000 {
            b.advance(&mut ctx);
            min_x = min_x.min(b.rect.left());
            max_x = max_x.max(b.rect.left());
        }
        assert!(min_x >= 1008.0 - BOSS_PATROL_SPEED);
        assert!(max_x <= 1008.0 + 288.0 + BOSS_PATROL_SPEED);
        assert!(max_x > 1250.0 && min_x < 1050.0);
    }

    #[test]
    fn test_hit_animation_returns_to_idle() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = AdvanceContext {
            rng: &mut rng,
            tick_rate: 60,
        };
        let mut b = boss();
        b.take_hit(HitSide::Top);
        // 4 frames * 5 ticks
        for _ in 0..19 {
            b.advance(&mut ctx);
        }
        assert_eq!(b.animation, BossAnimation::TopHit);
        b.advance(&mut ctx);
        assert_ne!(b.animation, BossAnimation::TopHit);
        assert!(b.hit);
    }

    #[test]
    fn test_invincibility_window() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ctx = AdvanceContext {
            rng: &mut rng,
            tick_rate: 60,
        };
        let mut b = boss();
        b.take_hit(HitSide::Top);
        for _ in 0..30 {
            b.advance(&mut ctx);
        }
        assert!(b.hit);
        assert!(!b.take_hit(HitSide::Top));
        b.advance(&mut ctx);
        assert!(!b.hit);
        assert!(b.take_hit(HitSide::Top));
        assert_eq!(b.health, 3);
    }

    #[test]
    fn test_blink_happens_eventually() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ctx = AdvanceContext {
            rng: &mut rng,
            tick_rate: 60,
        };
        let mut b = boss();
        let blinked = (0..20_000).any(|_| {
            b.advance(&mut ctx);
            b.animation == BossAnimation::Blink
        });
        assert!(blinked);
    }

    #[test]
    fn test_hidden_boss_is_inert() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ctx = AdvanceContext {
            rng: &mut rng,
            tick_rate: 60,
        };
        let mut b = boss();
        b.visible = false;
        let before = b.rect;
        b.advance(&mut ctx);
        assert_eq!(b.rect, before);
        assert!(!b.is_flash_visible());
    }

    #[test]
    fn test_health_ratio() {
        let mut b = boss();
        assert_eq!(b.health_ratio(), 1.0);
        b.take_hit(HitSide::Top);
        assert!((b.health_ratio() - 0.8).abs() < 1e-6);
    }
}

//! Collision detection and response
//!
//! Resolution is axis-separated: vertical motion is resolved against terrain
//! first, then horizontal motion, and only then are hazards, collectibles,
//! checkpoints and the boss tested against the corrected position.

use glam::Vec2;

use super::boss::{Boss, BossAnimation, HitSide};
use super::entity::{Block, Checkpoint, CheckpointKind, Collectible, Entity, Hazard};
use super::mask::Mask;
use super::player::Player;
use super::rect::Rect;
use super::state::{DamageSource, GameEvent};
use crate::settings::Settings;

/// A positioned silhouette
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    pub rect: Rect,
    pub mask: &'a Mask,
}

impl Shape<'_> {
    /// Integer pixel origin used for the mask test
    #[inline]
    fn pixel_origin(&self) -> (i32, i32) {
        (self.rect.pos.x.floor() as i32, self.rect.pos.y.floor() as i32)
    }
}

/// Pixel-precise overlap test between two positioned silhouettes
pub fn shapes_overlap(a: Shape<'_>, b: Shape<'_>) -> bool {
    let (ax, ay) = a.pixel_origin();
    let (bx, by) = b.pixel_origin();
    a.mask.overlap(b.mask, (bx - ax, by - ay))
}

#[inline]
fn touches(player: &Player, entity: &impl Entity) -> bool {
    shapes_overlap(player.shape(), entity.shape())
}

/// Stop the player at the left edge of the world
///
/// There is no right wall; the camera clamp is the only right bound.
pub fn clamp_left_boundary(player: &mut Player) {
    if player.vel.x < 0.0 && player.rect.left() + player.vel.x < 0.0 {
        player.vel.x = 0.0;
        player.rect.set_left(0.0);
    }
}

/// Apply vertical displacement and resolve against every terrain block
pub fn resolve_vertical(player: &mut Player, blocks: &[Block]) {
    let dy = player.vel.y;
    player.translate(Vec2::new(0.0, dy));

    for block in blocks {
        if !touches(player, block) {
            continue;
        }
        if dy > 0.0 {
            player.rect.set_bottom(block.rect.top());
            player.landed();
        } else if dy < 0.0 {
            player.rect.set_top(block.rect.bottom());
            player.hit_head();
        }
    }
}

/// Apply horizontal displacement and stop at the first block hit
///
/// Blocks never overlap each other, so the first hit is the only one.
pub fn resolve_horizontal(player: &mut Player, blocks: &[Block]) -> bool {
    let dx = player.vel.x;
    player.translate(Vec2::new(dx, 0.0));

    let Some(block) = blocks.iter().find(|b| touches(player, *b)) else {
        return false;
    };
    if dx > 0.0 {
        player.rect.set_right(block.rect.left());
    } else if dx < 0.0 {
        player.rect.set_left(block.rect.right());
    }
    true
}

/// Damage the player on hazard contact (at most once per tick)
pub fn check_hazards(player: &mut Player, hazards: &[Hazard], events: &mut Vec<GameEvent>) -> bool {
    if player.hit {
        return false;
    }
    let Some(hazard) = hazards.iter().find(|h| touches(player, *h)) else {
        return false;
    };
    if player.make_hit() {
        events.push(GameEvent::PlayerDamaged {
            source: DamageSource::Hazard(hazard.kind),
            health: player.health,
        });
        return true;
    }
    false
}

/// Consume every collectible the player touches this tick
///
/// Overlaps are gathered first and removed afterwards.
pub fn check_collectibles(
    player: &mut Player,
    collectibles: &mut Vec<Collectible>,
    events: &mut Vec<GameEvent>,
) -> usize {
    let collected: Vec<(u32, u64)> = collectibles
        .iter()
        .filter(|c| touches(player, *c))
        .map(|c| (c.id, c.points))
        .collect();

    for &(id, points) in &collected {
        player.add_score(points);
        events.push(GameEvent::ItemCollected { id, points });
        log::debug!("Collected item {id}, score {}", player.score);
    }
    if !collected.is_empty() {
        collectibles.retain(|c| !collected.iter().any(|&(id, _)| id == c.id));
    }
    collected.len()
}

/// Activate touched checkpoints; returns true if an end checkpoint was reached
///
/// Start checkpoints only write the respawn snapshot on their first touch.
/// End checkpoints activate on every touch.
pub fn check_checkpoints(
    player: &mut Player,
    checkpoints: &mut [Checkpoint],
    events: &mut Vec<GameEvent>,
) -> bool {
    for checkpoint in checkpoints.iter_mut() {
        if !touches(player, &*checkpoint) {
            continue;
        }
        match checkpoint.kind {
            CheckpointKind::Start => {
                if checkpoint.activate_start(player) {
                    events.push(GameEvent::CheckpointActivated {
                        id: checkpoint.id,
                        kind: CheckpointKind::Start,
                    });
                }
            }
            CheckpointKind::End => {
                checkpoint.activate_end();
                events.push(GameEvent::EndReached { id: checkpoint.id });
                return true;
            }
        }
    }
    false
}

/// Was the player above the boss before this tick's vertical move?
pub fn is_stomp(player: &Player, boss: &Boss, tolerance: f32) -> bool {
    let prior_bottom = player.rect.bottom() - player.vel.y;
    player.vel.y > 0.0 && prior_bottom <= boss.rect.top() + tolerance
}

/// Resolve player/boss contact
///
/// A stomp bounces the player and damages the boss. Any other contact,
/// while neither side is invincible, damages the player and knocks them
/// away from the boss.
pub fn resolve_boss_contact(
    player: &mut Player,
    boss: &mut Boss,
    settings: &Settings,
    events: &mut Vec<GameEvent>,
) {
    if !boss.is_active() || !touches(player, &*boss) {
        return;
    }

    if is_stomp(player, boss, settings.stomp_tolerance) {
        player.rect.set_bottom(boss.rect.top());
        // Clear fall state first so the bounce behaves like a fresh jump
        player.landed();
        player.vel.y = settings.jump_velocity();
        if boss.take_hit(HitSide::Top) {
            events.push(GameEvent::BossHit {
                side: HitSide::Top,
                health: boss.health,
            });
        }
        return;
    }

    if boss.hit || player.hit {
        return;
    }
    player.make_hit();
    events.push(GameEvent::PlayerDamaged {
        source: DamageSource::Boss,
        health: player.health,
    });

    let from_left = player.rect.center_x() < boss.rect.center_x();
    if from_left {
        boss.set_animation(BossAnimation::RightHit);
        player.translate(Vec2::new(-settings.boss_knockback, 0.0));
    } else {
        boss.set_animation(BossAnimation::LeftHit);
        player.translate(Vec2::new(settings.boss_knockback, 0.0));
    }
}

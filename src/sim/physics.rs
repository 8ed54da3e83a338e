//! Player physics integration
//!
//! Runs once per tick before collision resolution and knows nothing about
//! level geometry.

use super::player::Player;
use crate::settings::Settings;

/// Apply the gravity ramp and current velocity to the player
///
/// Extra downward velocity per tick is `min(1, fall_count / tick_rate * gravity)`,
/// so gravity eases in after leaving the ground. Also counts down the
/// invincibility window and advances the animation counter.
pub fn integrate(player: &mut Player, settings: &Settings) {
    player.vel.y += gravity_step(player.fall_count, settings);
    player.translate(player.vel);

    if player.hit {
        player.hit_count += 1;
    }
    if player.hit_count > settings.player_invincibility_ticks() {
        player.hit = false;
        player.hit_count = 0;
    }

    player.fall_count += 1;
    player.animation_count += 1;
}

/// Vertical acceleration applied after `fall_count` airborne ticks
#[inline]
pub fn gravity_step(fall_count: u32, settings: &Settings) -> f32 {
    let tick_rate = settings.tick_rate.max(1) as f32;
    ((fall_count as f32 / tick_rate) * settings.gravity).min(1.0)
}

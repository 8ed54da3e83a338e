//! Fixed timestep simulation tick
//!
//! One call advances a level session by exactly one tick:
//! input, physics, entity animation, collision, then terminal checks and
//! the camera.

use glam::Vec2;

use super::collision::{
    check_checkpoints, check_collectibles, check_hazards, clamp_left_boundary,
    resolve_boss_contact, resolve_horizontal, resolve_vertical, shapes_overlap,
};
use super::entity::{AdvanceContext, Entity};
use super::physics;
use super::state::{DamageSource, GameEvent, LevelSession, Outcome};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Move left (held)
    pub move_left: bool,
    /// Move right (held); wins over left when both are held
    pub move_right: bool,
    /// Jump pressed this tick
    pub jump: bool,
    /// Leave the level
    pub quit: bool,
}

/// Advance the session by one fixed timestep
///
/// Returns everything that happened this tick. Sessions that already reached
/// an outcome are left untouched.
pub fn tick(session: &mut LevelSession, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if session.outcome.is_terminal() {
        return events;
    }

    if input.quit {
        finish(session, Outcome::Quit, &mut events);
        return events;
    }

    session.time_ticks += 1;

    apply_input(session, input);
    physics::integrate(&mut session.player, &session.settings);
    advance_entities(session);
    let end_reached = resolve_collisions(session, &mut events);

    // Fell out of the world: no respawn, the run is over
    if session.player.rect.top() > session.settings.fall_out_y() {
        session.player.health = 0;
        events.push(GameEvent::PlayerDamaged {
            source: DamageSource::Fall,
            health: 0,
        });
        log::debug!("Player fell out at y={}", session.player.rect.top());
    }

    if session.player.is_dead() {
        finish(session, Outcome::Lose, &mut events);
    } else {
        handle_boss_defeat(session, &mut events);
        if is_won(session, end_reached) {
            finish(session, Outcome::Win, &mut events);
        }
    }

    session.update_camera();
    events
}

fn apply_input(session: &mut LevelSession, input: &TickInput) {
    let settings = &session.settings;
    let player = &mut session.player;

    player.vel.x = 0.0;
    if input.move_left {
        player.move_left(settings.player_speed);
    }
    if input.move_right {
        player.move_right(settings.player_speed);
    }
    if input.jump && player.jump(settings.jump_velocity()) {
        log::trace!("Jump {} at tick {}", player.jump_count, session.time_ticks);
    }
}

fn advance_entities(session: &mut LevelSession) {
    let mut ctx = AdvanceContext {
        rng: &mut session.rng,
        tick_rate: session.settings.tick_rate,
    };
    for hazard in &mut session.hazards {
        hazard.advance(&mut ctx);
    }
    for checkpoint in &mut session.checkpoints {
        checkpoint.advance(&mut ctx);
    }
    if let Some(boss) = session.boss.as_mut() {
        boss.advance(&mut ctx);
    }
}

/// Run the collision pipeline; returns true if an end checkpoint was touched
fn resolve_collisions(session: &mut LevelSession, events: &mut Vec<GameEvent>) -> bool {
    let player = &mut session.player;

    clamp_left_boundary(player);
    resolve_vertical(player, &session.blocks);
    resolve_horizontal(player, &session.blocks);

    check_hazards(player, &session.hazards, events);
    check_collectibles(player, &mut session.collectibles, events);
    let end_reached = check_checkpoints(player, &mut session.checkpoints, events);

    if let Some(boss) = session.boss.as_mut() {
        resolve_boss_contact(player, boss, &session.settings, events);
    }
    end_reached
}

/// Hide a defeated boss and move the goal into the arena (once)
fn handle_boss_defeat(session: &mut LevelSession, events: &mut Vec<GameEvent>) {
    if session.boss_defeat_handled {
        return;
    }
    let Some(boss) = session.boss.as_mut() else {
        return;
    };
    if !boss.is_defeated() {
        return;
    }

    boss.visible = false;
    let boss_center_x = boss.rect.center_x();
    let boss_bottom = boss.rect.bottom();
    session.boss_defeat_handled = true;

    let Some(goal) = session.goal_mut() else {
        log::warn!("Boss defeated but the level has no end checkpoint");
        return;
    };
    goal.rect.pos = Vec2::new(
        boss_center_x - goal.rect.width() / 2.0,
        boss_bottom - goal.rect.height() - 20.0,
    );
    goal.activate_end();
    let goal_pos = goal.rect.pos;

    log::info!("Boss defeated, goal at ({}, {})", goal_pos.x, goal_pos.y);
    events.push(GameEvent::BossDefeated { goal: goal_pos });
}

fn is_won(session: &LevelSession, end_reached: bool) -> bool {
    if !session.is_boss_level() {
        return end_reached;
    }
    if !session.is_boss_defeated() {
        return false;
    }
    session
        .goal()
        .is_some_and(|goal| goal.active && shapes_overlap(session.player.shape(), goal.shape()))
}

fn finish(session: &mut LevelSession, outcome: Outcome, events: &mut Vec<GameEvent>) {
    session.outcome = outcome;
    events.push(GameEvent::OutcomeChanged(outcome));
    log::info!(
        "Level '{}' ended: {:?} after {} ticks, score {}",
        session.spec.name,
        outcome,
        session.time_ticks,
        session.player.score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::entity::{CheckpointKind, HazardKind, Terrain};
    use crate::sim::level::{LevelId, LevelSpec, Placement};
    use proptest::prelude::*;

    const FLOOR_Y: f32 = 704.0;

    /// Flat floor of `cols` blocks plus extra placements
    fn flat_level(cols: u32, start: Vec2, extra: Vec<Placement>) -> LevelSession {
        let mut placements: Vec<Placement> = (0..cols)
            .map(|i| Placement::Block {
                x: i as f32 * 96.0,
                y: FLOOR_Y,
                terrain: Terrain::GrassTop,
                size: 96.0,
            })
            .collect();
        placements.extend(extra);
        let spec = LevelSpec {
            name: "test".into(),
            player_start: start,
            placements,
        };
        LevelSession::new(spec, &Settings::default(), 42)
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_spike_damage_respects_invincibility() {
        let mut session = flat_level(
            10,
            Vec2::new(300.0, FLOOR_Y - 64.0),
            vec![Placement::Spikes {
                x: 280.0,
                y: FLOOR_Y - 96.0,
            }],
        );

        let events = tick(&mut session, &idle());
        assert_eq!(session.player.health, 4);
        assert!(events.contains(&GameEvent::PlayerDamaged {
            source: DamageSource::Hazard(HazardKind::Spikes),
            health: 4,
        }));

        // Still standing on the spikes, but invincible
        for _ in 1..121 {
            tick(&mut session, &idle());
        }
        assert_eq!(session.time_ticks, 121);
        assert_eq!(session.player.health, 4);

        tick(&mut session, &idle());
        assert_eq!(session.player.health, 3);
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut session = flat_level(10, Vec2::new(300.0, FLOOR_Y - 200.0), Vec::new());
        for _ in 0..120 {
            tick(&mut session, &idle());
        }
        // Gravity eases back in after each landing, so allow sub-pixel sink
        assert!((session.player.rect.bottom() - FLOOR_Y).abs() < 1.0);
        assert_eq!(session.player.jump_count, 0);
        assert_eq!(session.outcome, Outcome::Running);
    }

    #[test]
    fn test_collect_two_in_one_tick() {
        let mut session = flat_level(
            10,
            Vec2::new(300.0, FLOOR_Y - 64.0),
            vec![
                Placement::Collectible {
                    x: 250.0,
                    y: FLOOR_Y - 96.0,
                },
                Placement::Collectible {
                    x: 320.0,
                    y: FLOOR_Y - 96.0,
                },
                Placement::Collectible {
                    x: 800.0,
                    y: FLOOR_Y - 96.0,
                },
            ],
        );
        let events = tick(&mut session, &idle());
        assert_eq!(session.player.score, 20);
        assert_eq!(session.collectibles.len(), 1);
        let collected = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ItemCollected { .. }))
            .count();
        assert_eq!(collected, 2);

        tick(&mut session, &idle());
        assert_eq!(session.player.score, 20);
    }

    #[test]
    fn test_start_checkpoint_snapshot_written_once() {
        let mut session = flat_level(
            10,
            Vec2::new(300.0, FLOOR_Y - 64.0),
            vec![Placement::StartCheckpoint {
                x: 280.0,
                y: FLOOR_Y - 128.0,
                activate_on_load: false,
            }],
        );
        let events = tick(&mut session, &idle());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::CheckpointActivated {
                kind: CheckpointKind::Start,
                ..
            }
        )));
        assert_eq!(session.player.respawn.health, 5);
        assert_eq!(session.player.respawn.pos, Vec2::new(280.0 + 64.0 - 32.0, FLOOR_Y - 128.0 - 64.0));

        session.player.health = 2;
        let events = tick(&mut session, &idle());
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::CheckpointActivated { .. })));
        assert_eq!(session.player.respawn.health, 5);
    }

    #[test]
    fn test_standard_level_win_on_goal() {
        let mut session = flat_level(
            10,
            Vec2::new(300.0, FLOOR_Y - 64.0),
            vec![Placement::EndCheckpoint {
                x: 400.0,
                y: FLOOR_Y - 128.0,
            }],
        );
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        let mut won_at = None;
        for t in 0..60 {
            let events = tick(&mut session, &right);
            if events.contains(&GameEvent::OutcomeChanged(Outcome::Win)) {
                assert!(events.iter().any(|e| matches!(e, GameEvent::EndReached { .. })));
                won_at = Some(t);
                break;
            }
        }
        assert!(won_at.is_some());
        assert_eq!(session.outcome, Outcome::Win);

        // Terminal sessions ignore further ticks
        let ticks = session.time_ticks;
        let pos = session.player.rect.pos;
        assert!(tick(&mut session, &right).is_empty());
        assert_eq!(session.time_ticks, ticks);
        assert_eq!(session.player.rect.pos, pos);
    }

    #[test]
    fn test_fall_out_loses_same_tick() {
        let mut session = flat_level(2, Vec2::new(500.0, 100.0), Vec::new());
        let limit = session.settings.fall_out_y();
        for _ in 0..1000 {
            let events = tick(&mut session, &idle());
            if session.player.rect.top() > limit {
                assert_eq!(session.player.health, 0);
                assert_eq!(session.outcome, Outcome::Lose);
                assert!(events.contains(&GameEvent::PlayerDamaged {
                    source: DamageSource::Fall,
                    health: 0,
                }));
                assert!(events.contains(&GameEvent::OutcomeChanged(Outcome::Lose)));
                return;
            }
            assert_eq!(session.player.health, 5);
            assert_eq!(session.outcome, Outcome::Running);
        }
        panic!("player never fell out");
    }

    #[test]
    fn test_quit() {
        let mut session = LevelSession::load(LevelId::Level01, &Settings::default(), 1);
        let events = tick(
            &mut session,
            &TickInput {
                quit: true,
                ..Default::default()
            },
        );
        assert_eq!(events, vec![GameEvent::OutcomeChanged(Outcome::Quit)]);
        assert_eq!(session.outcome, Outcome::Quit);
        assert_eq!(session.time_ticks, 0);
        assert!(tick(&mut session, &idle()).is_empty());
    }

    #[test]
    fn test_double_jump_only() {
        let mut session = flat_level(10, Vec2::new(300.0, FLOOR_Y - 64.0), Vec::new());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut session, &jump);
        assert_eq!(session.player.jump_count, 1);
        tick(&mut session, &jump);
        assert_eq!(session.player.jump_count, 2);
        let vel_before = session.player.vel.y;
        tick(&mut session, &jump);
        assert_eq!(session.player.jump_count, 2);
        // Third press ignored: gravity keeps acting instead
        assert!(session.player.vel.y > vel_before);
    }

    fn arena() -> LevelSession {
        flat_level(
            16,
            Vec2::new(0.0, FLOOR_Y - 64.0),
            vec![
                Placement::Boss {
                    x: 600.0,
                    y: FLOOR_Y - 126.0,
                    patrol_start_x: 500.0,
                    patrol_distance: 288.0,
                },
                Placement::EndCheckpoint {
                    x: -500.0,
                    y: -500.0,
                },
            ],
        )
    }

    /// Drop the player onto the boss so this tick is judged a stomp
    fn line_up_stomp(session: &mut LevelSession) {
        let boss = session.boss.as_ref().expect("boss");
        let x = boss.rect.center_x() - 32.0;
        let y = boss.rect.top() - 64.0 - 2.0;
        let player = &mut session.player;
        player.rect.pos = Vec2::new(x, y);
        player.vel = Vec2::new(0.0, 4.0);
        player.fall_count = 0;
    }

    fn park_player(session: &mut LevelSession) {
        session.player.rect.pos = Vec2::new(0.0, FLOOR_Y - 64.0);
        session.player.vel = Vec2::ZERO;
        session.player.fall_count = 0;
    }

    #[test]
    fn test_five_stomps_defeat_boss() {
        let mut session = arena();
        assert!(session.is_boss_level());

        for stomp in 1..=5u32 {
            line_up_stomp(&mut session);
            let events = tick(&mut session, &idle());
            let boss = session.boss.as_ref().expect("boss");
            assert_eq!(boss.health, 5 - stomp);
            assert!(events.iter().any(|e| matches!(e, GameEvent::BossHit { .. })));
            assert_eq!(session.player.vel.y, session.settings.jump_velocity());
            assert_eq!(session.player.health, 5);

            if stomp < 5 {
                assert!(boss.visible);
                park_player(&mut session);
                for _ in 0..40 {
                    tick(&mut session, &idle());
                }
                assert!(!session.boss.as_ref().expect("boss").hit);
            } else {
                assert!(events.iter().any(|e| matches!(e, GameEvent::BossDefeated { .. })));
            }
        }

        let boss = session.boss.as_ref().expect("boss");
        assert!(!boss.visible);
        let goal = session.goal().expect("goal");
        assert!(goal.active);
        assert_eq!(
            goal.rect.pos,
            Vec2::new(
                boss.rect.center_x() - 64.0,
                boss.rect.bottom() - 128.0 - 20.0
            )
        );
        // Player is standing where the boss was, inside the goal
        assert_eq!(session.outcome, Outcome::Win);
    }

    #[test]
    fn test_boss_defeat_without_reaching_goal() {
        let mut session = arena();
        if let Some(boss) = session.boss.as_mut() {
            boss.health = 0;
        }
        let events = tick(&mut session, &idle());
        assert!(events.iter().any(|e| matches!(e, GameEvent::BossDefeated { .. })));
        assert!(session.goal().expect("goal").active);

        // Goal is far from the player: defeat alone does not win
        for _ in 0..10 {
            let events = tick(&mut session, &idle());
            assert!(!events.iter().any(|e| matches!(e, GameEvent::BossDefeated { .. })));
        }
        assert_eq!(session.outcome, Outcome::Running);
    }

    #[test]
    fn test_boss_side_contact_hurts_player() {
        let mut session = arena();
        let boss_left = session.boss.as_ref().expect("boss").rect.left();
        session.player.rect.pos = Vec2::new(boss_left - 60.0, FLOOR_Y - 64.0);
        let events = tick(&mut session, &idle());
        assert!(events.contains(&GameEvent::PlayerDamaged {
            source: DamageSource::Boss,
            health: 4,
        }));
        assert_eq!(session.boss.as_ref().expect("boss").health, 5);
    }

    #[test]
    fn test_determinism() {
        let mut a = LevelSession::load(LevelId::Level02, &Settings::default(), 99);
        let mut b = LevelSession::load(LevelId::Level02, &Settings::default(), 99);
        for t in 0..600u32 {
            let input = TickInput {
                move_right: t % 7 != 0,
                jump: t % 45 == 0,
                ..Default::default()
            };
            assert_eq!(tick(&mut a, &input), tick(&mut b, &input));
        }
        assert_eq!(a.player.rect, b.player.rect);
        let (ba, bb) = (a.boss.expect("boss"), b.boss.expect("boss"));
        assert_eq!(ba.rect, bb.rect);
        assert_eq!(ba.animation, bb.animation);
    }

    #[test]
    fn test_camera_follows_within_bounds() {
        let mut session = LevelSession::load(LevelId::Level01, &Settings::default(), 1);
        let right = TickInput {
            move_right: true,
            ..Default::default()
        };
        let max = session.max_camera_offset();
        let mut scrolled = false;
        for _ in 0..200 {
            tick(&mut session, &right);
            assert!(session.camera_offset >= 0.0);
            assert!(session.camera_offset <= max);
            scrolled |= session.camera_offset > 0.0;
        }
        assert!(scrolled);
    }

    fn input_strategy() -> impl Strategy<Value = TickInput> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(move_left, move_right, jump)| {
            TickInput {
                move_left,
                move_right,
                jump,
                quit: false,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_player_invariants_hold(
            boss_level in any::<bool>(),
            seed in any::<u64>(),
            inputs in proptest::collection::vec(input_strategy(), 1..400),
        ) {
            let id = if boss_level { LevelId::Level02 } else { LevelId::Level01 };
            let mut session = LevelSession::load(id, &Settings::default(), seed);
            let max_offset = session.max_camera_offset();
            for input in &inputs {
                tick(&mut session, input);
                let p = &session.player;
                prop_assert!(p.health <= p.max_health);
                prop_assert!(p.jump_count <= 2);
                prop_assert!(session.camera_offset >= 0.0);
                prop_assert!(session.camera_offset <= max_offset);
                if let Some(boss) = &session.boss {
                    prop_assert!(boss.health <= boss.max_health);
                }
            }
        }
    }
}

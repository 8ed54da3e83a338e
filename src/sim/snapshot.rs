//! Read-only view of a session for renderers
//!
//! Everything a frame needs, in world coordinates plus the camera offset.
//! Serializable so headless runs can dump it as JSON.

use serde::Serialize;

use super::entity::{CheckpointKind, Entity};
use super::rect::Rect;
use super::state::{LevelSession, Outcome};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub rect: Rect,
    /// Sheet name such as `double_jump_right`
    pub sprite: String,
    pub animation_count: u32,
    /// False on invincibility blink-off ticks
    pub visible: bool,
    pub health: u32,
    pub max_health: u32,
    pub score: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: &'static str,
    pub rect: Rect,
    pub animation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub rect: Rect,
    pub animation: &'static str,
    pub frame: u32,
    pub visible: bool,
    pub health: u32,
    pub max_health: u32,
}

/// One frame's worth of renderable state
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub level: String,
    pub tick: u64,
    pub outcome: Outcome,
    pub camera_offset: f32,
    pub world_width: f32,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
    pub boss: Option<BossView>,
}

impl FrameSnapshot {
    pub fn capture(session: &LevelSession) -> Self {
        let player = &session.player;

        let mut entities = Vec::with_capacity(
            session.blocks.len()
                + session.hazards.len()
                + session.collectibles.len()
                + session.checkpoints.len(),
        );
        entities.extend(session.blocks.iter().map(|b| view("block", b)));
        entities.extend(session.hazards.iter().map(|h| view(h.kind.as_str(), h)));
        entities.extend(session.collectibles.iter().map(|c| view("collectible", c)));
        entities.extend(session.checkpoints.iter().map(|c| {
            view(
                match c.kind {
                    CheckpointKind::Start => "start_checkpoint",
                    CheckpointKind::End => "end_checkpoint",
                },
                c,
            )
        }));
        entities.sort_by_key(|e| e.id);

        Self {
            level: session.spec.name.clone(),
            tick: session.time_ticks,
            outcome: session.outcome,
            camera_offset: session.camera_offset,
            world_width: session.world_width,
            player: PlayerView {
                rect: player.rect,
                sprite: player.sprite_key(),
                animation_count: player.animation_count,
                visible: player.is_flash_visible(),
                health: player.health,
                max_health: player.max_health,
                score: player.score,
            },
            entities,
            boss: session.boss.as_ref().map(|boss| BossView {
                rect: boss.rect,
                animation: boss.animation_tag(),
                frame: boss.frame_index(),
                visible: boss.is_flash_visible(),
                health: boss.health,
                max_health: boss.max_health,
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn view(kind: &'static str, entity: &impl Entity) -> EntityView {
    EntityView {
        id: entity.id(),
        kind,
        rect: entity.rect(),
        animation: entity.animation_tag(),
    }
}

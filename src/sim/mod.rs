//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (placement order, which is also entity ID order)
//! - No rendering or platform dependencies

pub mod boss;
pub mod collision;
pub mod entity;
pub mod level;
pub mod mask;
pub mod physics;
pub mod player;
pub mod rect;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use boss::{Boss, BossAnimation, HitSide};
pub use collision::{Shape, shapes_overlap};
pub use entity::{
    AdvanceContext, Block, Checkpoint, CheckpointKind, Collectible, Entity, Hazard, HazardKind,
    Terrain,
};
pub use level::{LevelId, LevelSpec, Placement};
pub use mask::Mask;
pub use player::{Facing, Player, PlayerAnimation, RespawnPoint};
pub use rect::Rect;
pub use snapshot::FrameSnapshot;
pub use state::{DamageSource, GameEvent, LevelSession, Outcome, camera_offset_for};
pub use tick::{TickInput, tick};

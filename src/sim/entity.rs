//! Level entities: terrain, hazards, collectibles and checkpoints
//!
//! Each kind is its own struct; the session keeps them in typed vectors so
//! collision code dispatches on type rather than on a name tag.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Shape;
use super::mask::Mask;
use super::player::Player;
use super::rect::Rect;
use crate::consts::*;

/// Per-tick context handed to entities when they advance
pub struct AdvanceContext<'a> {
    /// Session RNG (seeded, deterministic)
    pub rng: &'a mut Pcg32,
    pub tick_rate: u32,
}

/// Shared contract for everything placed in a level
pub trait Entity {
    fn id(&self) -> u32;

    /// World-space bounding box
    fn rect(&self) -> Rect;

    /// Silhouette of the current animation frame
    fn mask(&self) -> &Mask;

    /// Animation state name for the renderer
    fn animation_tag(&self) -> &'static str;

    /// Advance animation/motion by one tick
    fn advance(&mut self, _ctx: &mut AdvanceContext<'_>) {}

    fn shape(&self) -> Shape<'_> {
        Shape {
            rect: self.rect(),
            mask: self.mask(),
        }
    }
}

/// Terrain tile variants (visual only, identical collision)
///
/// Deserialized through `Terrain::from_key`, so unknown keys fall back to
/// grass instead of rejecting the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Terrain {
    #[default]
    GrassTop,
    DirtFill,
    #[serde(rename = "GRASS_TOP_L")]
    GrassTopLeft,
    #[serde(rename = "GRASS_TOP_R")]
    GrassTopRight,
    StoneTop,
    StoneFill,
    SandTop,
    SandFill,
    IceTop,
    IceFill,
}

impl Terrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terrain::GrassTop => "GRASS_TOP",
            Terrain::DirtFill => "DIRT_FILL",
            Terrain::GrassTopLeft => "GRASS_TOP_L",
            Terrain::GrassTopRight => "GRASS_TOP_R",
            Terrain::StoneTop => "STONE_TOP",
            Terrain::StoneFill => "STONE_FILL",
            Terrain::SandTop => "SAND_TOP",
            Terrain::SandFill => "SAND_FILL",
            Terrain::IceTop => "ICE_TOP",
            Terrain::IceFill => "ICE_FILL",
        }
    }

    /// Parse a terrain key; unknown keys fall back to grass
    pub fn from_key(key: &str) -> Self {
        match key.to_uppercase().as_str() {
            "GRASS_TOP" => Terrain::GrassTop,
            "DIRT_FILL" => Terrain::DirtFill,
            "GRASS_TOP_L" => Terrain::GrassTopLeft,
            "GRASS_TOP_R" => Terrain::GrassTopRight,
            "STONE_TOP" => Terrain::StoneTop,
            "STONE_FILL" => Terrain::StoneFill,
            "SAND_TOP" => Terrain::SandTop,
            "SAND_FILL" => Terrain::SandFill,
            "ICE_TOP" => Terrain::IceTop,
            "ICE_FILL" => Terrain::IceFill,
            _ => {
                log::warn!("Unknown terrain key '{key}', using GRASS_TOP");
                Terrain::GrassTop
            }
        }
    }

    /// (column, row) of the 32px tile in the terrain sheet
    pub fn tile(&self) -> (u32, u32) {
        match self {
            Terrain::GrassTop => (1, 0),
            Terrain::DirtFill => (1, 1),
            Terrain::GrassTopLeft => (0, 0),
            Terrain::GrassTopRight => (2, 0),
            Terrain::StoneTop => (3, 0),
            Terrain::StoneFill => (3, 1),
            Terrain::SandTop => (4, 0),
            Terrain::SandFill => (4, 1),
            Terrain::IceTop => (9, 0),
            Terrain::IceFill => (9, 1),
        }
    }
}

impl From<String> for Terrain {
    fn from(key: String) -> Self {
        Terrain::from_key(&key)
    }
}

/// A static square of terrain
#[derive(Debug, Clone)]
pub struct Block {
    pub id: u32,
    pub rect: Rect,
    pub terrain: Terrain,
    mask: Mask,
}

impl Block {
    pub fn new(id: u32, pos: Vec2, size: f32, terrain: Terrain) -> Self {
        let rect = Rect::square(pos.x, pos.y, size);
        Self {
            id,
            rect,
            terrain,
            mask: Mask::solid_for(rect.size),
        }
    }
}

impl Entity for Block {
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
        self.terrain.as_str()
    }
}

/// Hazard types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    Fire,
    Spikes,
    Lava,
}

impl HazardKind {
    /// Footprint of a freshly placed hazard
    pub fn size(&self) -> Vec2 {
        match self {
            HazardKind::Fire => Vec2::new(FIRE_WIDTH, FIRE_HEIGHT),
            HazardKind::Spikes | HazardKind::Lava => Vec2::splat(BLOCK_SIZE),
        }
    }

    /// Frames in the looping animation
    pub fn frame_count(&self) -> usize {
        match self {
            HazardKind::Fire => 3,
            HazardKind::Spikes | HazardKind::Lava => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Fire => "fire",
            HazardKind::Spikes => "spikes",
            HazardKind::Lava => "lava",
        }
    }
}

/// Ticks per hazard animation frame
pub const HAZARD_ANIMATION_DELAY: u32 = 3;

/// Fire, spikes or lava: damages on contact, never consumed
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub rect: Rect,
    /// One silhouette per animation frame
    frames: Vec<Mask>,
    pub animation_count: u32,
}

impl Hazard {
    /// Hazard with solid placeholder silhouettes
    pub fn new(id: u32, kind: HazardKind, pos: Vec2) -> Self {
        let size = kind.size();
        let frames = vec![Mask::solid_for(size); kind.frame_count()];
        Self::with_frames(id, kind, pos, frames)
    }

    /// Hazard with silhouettes supplied by the asset loader
    pub fn with_frames(id: u32, kind: HazardKind, pos: Vec2, frames: Vec<Mask>) -> Self {
        let size = kind.size();
        let frames = if frames.is_empty() {
            vec![Mask::solid_for(size)]
        } else {
            frames
        };
        Self {
            id,
            kind,
            rect: Rect::new(pos.x, pos.y, size.x, size.y),
            frames,
            animation_count: 0,
        }
    }

    /// Index of the frame currently shown
    pub fn frame_index(&self) -> usize {
        (self.animation_count / HAZARD_ANIMATION_DELAY) as usize % self.frames.len()
    }
}

impl Entity for Hazard {
    fn id(&self) -> u32 {
        self.id
    }

    fn rect(&self) -> Rect {
        self.rect
    }

    fn mask(&self) -> &Mask {
        &self.frames[self.frame_index()]
    }

    fn animation_tag(&self) -> &'static str {
        match self.kind {
            HazardKind::Fire => "on",
            HazardKind::Spikes | HazardKind::Lava => "idle",
        }
    }

    fn advance(&mut self, _ctx: &mut AdvanceContext<'_>) {
        if self.frames.len() < 2 {
            return;
        }
        self.animation_count += 1;
        if (self.animation_count / HAZARD_ANIMATION_DELAY) as usize >= self.frames.len() {
            self.animation_count = 0;
        }
    }
}

/// A banana: consumed on touch for points
#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: u32,
    pub rect: Rect,
    pub points: u64,
    mask: Mask,
}

impl Collectible {
    pub fn new(id: u32, pos: Vec2, points: u64) -> Self {
        let rect = Rect::square(pos.x, pos.y, COLLECTIBLE_SIZE);
        Self {
            id,
            rect,
            points,
            mask: Mask::solid_for(rect.size),
        }
    }
}

impl Entity for Collectible {
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
        "bananas"
    }
}

/// Checkpoint variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointKind {
    /// Writes the respawn snapshot
    Start,
    /// Level goal
    End,
}

/// Ticks per checkpoint animation frame
pub const CHECKPOINT_ANIMATION_DELAY: u32 = 4;

/// Start or end flag
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub id: u32,
    pub kind: CheckpointKind,
    pub rect: Rect,
    pub active: bool,
    pub animation_count: u32,
    mask: Mask,
}

impl Checkpoint {
    pub fn new(id: u32, kind: CheckpointKind, pos: Vec2) -> Self {
        let rect = Rect::square(pos.x, pos.y, CHECKPOINT_SIZE);
        Self {
            id,
            kind,
            rect,
            active: false,
            animation_count: 0,
            mask: Mask::solid_for(rect.size),
        }
    }

    /// Frames in the active animation
    pub fn active_frame_count(&self) -> u32 {
        match self.kind {
            CheckpointKind::Start => 17,
            CheckpointKind::End => 8,
        }
    }

    /// Activate a start checkpoint, writing the player's respawn snapshot
    ///
    /// Only the first activation writes; returns whether it did.
    pub fn activate_start(&mut self, player: &mut Player) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        let spawn = Vec2::new(
            self.rect.center_x() - player.rect.width() / 2.0,
            self.rect.top() - player.rect.height(),
        );
        player.set_respawn(spawn);
        log::debug!(
            "Checkpoint {} activated, respawn at ({}, {}) with {} health",
            self.id,
            spawn.x,
            spawn.y,
            player.respawn.health
        );
        true
    }

    /// Activate an end checkpoint (no guard: repeated calls are harmless)
    pub fn activate_end(&mut self) {
        self.active = true;
    }
}

impl Entity for Checkpoint {
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
        match (self.kind, self.active) {
            (_, false) => "idle",
            (CheckpointKind::Start, true) => "moving",
            (CheckpointKind::End, true) => "pressed",
        }
    }

    fn advance(&mut self, _ctx: &mut AdvanceContext<'_>) {
        if !self.active {
            self.animation_count = 0;
            return;
        }
        self.animation_count += 1;
        if self.animation_count / CHECKPOINT_ANIMATION_DELAY >= self.active_frame_count() {
            self.animation_count = 0;
        }
    }
}

//! Level session state and core simulation types
//!
//! A `LevelSession` exclusively owns every entity of one level run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{Boss, HitSide};
use super::entity::{Block, Checkpoint, CheckpointKind, Collectible, Hazard, HazardKind};
use super::level::{LevelId, LevelSpec, Placement};
use super::player::Player;
use crate::settings::Settings;

/// Terminal state of a level run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Running,
    Win,
    Lose,
    Quit,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        *self != Outcome::Running
    }
}

/// What hurt the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    Hazard(HazardKind),
    Boss,
    /// Fell out of the world
    Fall,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerDamaged { source: DamageSource, health: u32 },
    ItemCollected { id: u32, points: u64 },
    CheckpointActivated { id: u32, kind: CheckpointKind },
    EndReached { id: u32 },
    BossHit { side: HitSide, health: u32 },
    /// Boss hidden and goal moved into the arena
    BossDefeated { goal: Vec2 },
    OutcomeChanged(Outcome),
}

/// One run of one level
#[derive(Debug, Clone)]
pub struct LevelSession {
    pub spec: LevelSpec,
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub player: Player,
    pub blocks: Vec<Block>,
    pub hazards: Vec<Hazard>,
    pub collectibles: Vec<Collectible>,
    pub checkpoints: Vec<Checkpoint>,
    pub boss: Option<Boss>,
    /// Horizontal scroll, clamped to the world
    pub camera_offset: f32,
    pub world_width: f32,
    pub outcome: Outcome,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Goal relocation has run
    pub(crate) boss_defeat_handled: bool,
    next_id: u32,
}

impl LevelSession {
    /// Build a session from a layout
    pub fn new(spec: LevelSpec, settings: &Settings, seed: u64) -> Self {
        let player = Player::from_settings(spec.player_start, settings);
        let mut session = Self {
            spec: spec.clone(),
            settings: settings.clone(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player,
            blocks: Vec::new(),
            hazards: Vec::new(),
            collectibles: Vec::new(),
            checkpoints: Vec::new(),
            boss: None,
            camera_offset: 0.0,
            world_width: settings.viewport_width,
            outcome: Outcome::Running,
            time_ticks: 0,
            boss_defeat_handled: false,
            next_id: 1,
        };

        let mut activate_on_load = Vec::new();
        for placement in &spec.placements {
            if let Some(id) = session.place(placement) {
                activate_on_load.push(id);
            }
        }
        for id in activate_on_load {
            if let Some(cp) = session.checkpoints.iter_mut().find(|c| c.id == id) {
                cp.activate_start(&mut session.player);
            }
        }

        session.world_width = session.compute_world_width();
        session.update_camera();
        log::info!(
            "Loaded level '{}': {} blocks, {} hazards, {} collectibles, boss: {}, width {}",
            spec.name,
            session.blocks.len(),
            session.hazards.len(),
            session.collectibles.len(),
            session.boss.is_some(),
            session.world_width
        );
        session
    }

    /// Build a session for a built-in level
    pub fn load(id: LevelId, settings: &Settings, seed: u64) -> Self {
        Self::new(LevelSpec::builtin(id), settings, seed)
    }

    /// Fresh run of the same layout and seed
    pub fn restart(&mut self) {
        *self = Self::new(self.spec.clone(), &self.settings, self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Instantiate one placement; returns the checkpoint id if it should
    /// activate on load
    fn place(&mut self, placement: &Placement) -> Option<u32> {
        let id = self.next_entity_id();
        match *placement {
            Placement::Block {
                x,
                y,
                terrain,
                size,
            } => self.blocks.push(Block::new(id, Vec2::new(x, y), size, terrain)),
            Placement::Fire { x, y } => {
                self.hazards
                    .push(Hazard::new(id, HazardKind::Fire, Vec2::new(x, y)));
            }
            Placement::Spikes { x, y } => {
                self.hazards
                    .push(Hazard::new(id, HazardKind::Spikes, Vec2::new(x, y)));
            }
            Placement::Lava { x, y } => {
                self.hazards
                    .push(Hazard::new(id, HazardKind::Lava, Vec2::new(x, y)));
            }
            Placement::Collectible { x, y } => {
                let points = self.settings.collectible_points;
                self.collectibles
                    .push(Collectible::new(id, Vec2::new(x, y), points));
            }
            Placement::StartCheckpoint {
                x,
                y,
                activate_on_load,
            } => {
                self.checkpoints
                    .push(Checkpoint::new(id, CheckpointKind::Start, Vec2::new(x, y)));
                if activate_on_load {
                    return Some(id);
                }
            }
            Placement::EndCheckpoint { x, y } => {
                self.checkpoints
                    .push(Checkpoint::new(id, CheckpointKind::End, Vec2::new(x, y)));
            }
            Placement::Boss {
                x,
                y,
                patrol_start_x,
                patrol_distance,
            } => {
                if self.boss.is_some() {
                    log::warn!("Level '{}' places more than one boss, ignoring extra", self.spec.name);
                    return None;
                }
                self.boss = Some(Boss::new(
                    id,
                    Vec2::new(x, y),
                    patrol_start_x,
                    patrol_distance,
                    self.settings.boss_invincibility_ticks(),
                ));
            }
        }
        None
    }

    pub fn is_boss_level(&self) -> bool {
        self.boss.is_some()
    }

    /// Rightmost terrain/goal extent plus one block of run-out
    ///
    /// Standard levels are never narrower than the viewport.
    fn compute_world_width(&self) -> f32 {
        let block_size = crate::consts::BLOCK_SIZE;
        let rightmost = self
            .blocks
            .iter()
            .map(|b| b.rect.right())
            .chain(
                self.checkpoints
                    .iter()
                    .filter(|c| c.kind == CheckpointKind::End)
                    .map(|c| c.rect.right()),
            )
            .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |a| a.max(r))))
            .unwrap_or(self.settings.viewport_width);

        if self.is_boss_level() {
            rightmost + block_size
        } else {
            self.settings.viewport_width.max(rightmost + block_size)
        }
    }

    /// Largest camera offset for this world
    pub fn max_camera_offset(&self) -> f32 {
        (self.world_width - self.settings.viewport_width).max(0.0)
    }

    /// Center the camera on the player, clamped to the world
    pub fn update_camera(&mut self) {
        self.camera_offset = camera_offset_for(
            self.player.rect.center_x(),
            self.settings.viewport_width,
            self.world_width,
        );
    }

    /// The end checkpoint (goal), if the level has one
    pub fn goal(&self) -> Option<&Checkpoint> {
        self.checkpoints
            .iter()
            .find(|c| c.kind == CheckpointKind::End)
    }

    pub fn goal_mut(&mut self) -> Option<&mut Checkpoint> {
        self.checkpoints
            .iter_mut()
            .find(|c| c.kind == CheckpointKind::End)
    }

    pub fn is_boss_defeated(&self) -> bool {
        self.boss.as_ref().is_some_and(|b| b.is_defeated())
    }
}

/// Camera offset centering `focus_x` in the viewport, clamped to
/// `[0, max(0, world_width - viewport_width)]`
pub fn camera_offset_for(focus_x: f32, viewport_width: f32, world_width: f32) -> f32 {
    let max_offset = (world_width - viewport_width).max(0.0);
    (focus_x - viewport_width / 2.0).max(0.0).min(max_offset)
}

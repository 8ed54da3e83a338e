//! Level layouts
//!
//! A level is a declarative list of placements plus a player start. The two
//! built-in levels are authored here; others can be loaded from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Terrain;
use crate::consts::*;

/// Built-in level identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelId {
    /// Extended gauntlet
    #[default]
    Level01,
    /// Trap gauntlet into the Rock Head arena
    Level02,
}

impl LevelId {
    pub const ALL: [LevelId; 2] = [LevelId::Level01, LevelId::Level02];

    pub fn as_str(&self) -> &'static str {
        match self {
            LevelId::Level01 => "level_01",
            LevelId::Level02 => "level_02",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "level_01" | "01" | "1" => Some(LevelId::Level01),
            "level_02" | "02" | "2" | "boss" => Some(LevelId::Level02),
            _ => None,
        }
    }

    /// Parse an identifier, falling back to the first level
    pub fn parse_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::warn!("Unknown level '{s}', falling back to {}", LevelId::default().as_str());
            LevelId::default()
        })
    }

    /// Label shown on the level select screen
    pub fn display_name(&self) -> &'static str {
        match self {
            LevelId::Level01 => "Level 01",
            LevelId::Level02 => "BOSS ARENA",
        }
    }
}

fn default_block_size() -> f32 {
    BLOCK_SIZE
}

/// One entity in a level layout (top-left world position)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Placement {
    Block {
        x: f32,
        y: f32,
        #[serde(default)]
        terrain: Terrain,
        #[serde(default = "default_block_size")]
        size: f32,
    },
    Fire {
        x: f32,
        y: f32,
    },
    Spikes {
        x: f32,
        y: f32,
    },
    Lava {
        x: f32,
        y: f32,
    },
    Collectible {
        x: f32,
        y: f32,
    },
    StartCheckpoint {
        x: f32,
        y: f32,
        /// Write the respawn snapshot as soon as the level loads
        #[serde(default)]
        activate_on_load: bool,
    },
    EndCheckpoint {
        x: f32,
        y: f32,
    },
    Boss {
        x: f32,
        y: f32,
        patrol_start_x: f32,
        patrol_distance: f32,
    },
}

/// A complete level layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub name: String,
    pub player_start: Vec2,
    pub placements: Vec<Placement>,
}

impl LevelSpec {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn has_boss(&self) -> bool {
        self.placements
            .iter()
            .any(|p| matches!(p, Placement::Boss { .. }))
    }

    /// Built-in layout for a level
    pub fn builtin(id: LevelId) -> Self {
        match id {
            LevelId::Level01 => level_01(),
            LevelId::Level02 => level_02(),
        }
    }
}

/// Floor row sits one block above the bottom of the viewport
const FLOOR_Y: f32 = VIEWPORT_HEIGHT - BLOCK_SIZE;

struct Builder {
    placements: Vec<Placement>,
}

impl Builder {
    fn new() -> Self {
        Self {
            placements: Vec::new(),
        }
    }

    fn block(&mut self, col: f32, y: f32, terrain: Terrain) {
        self.placements.push(Placement::Block {
            x: col * BLOCK_SIZE,
            y,
            terrain,
            size: BLOCK_SIZE,
        });
    }

    /// Top tile plus a fill tile underneath
    fn ground(&mut self, col: f32, top: Terrain, fill: Terrain) {
        self.block(col, FLOOR_Y, top);
        self.block(col, FLOOR_Y + BLOCK_SIZE, fill);
    }

    /// Collectible resting on a surface at `surface_y`
    fn banana(&mut self, col: f32, surface_y: f32) {
        self.placements.push(Placement::Collectible {
            x: col * BLOCK_SIZE,
            y: surface_y - COLLECTIBLE_SIZE,
        });
    }

    fn push(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    fn finish(self, id: LevelId, player_start: Vec2) -> LevelSpec {
        LevelSpec {
            name: id.as_str().to_string(),
            player_start,
            placements: self.placements,
        }
    }
}

fn level_01() -> LevelSpec {
    let mut b = Builder::new();

    // Starting platform
    for i in 0..7 {
        b.ground(i as f32, Terrain::GrassTop, Terrain::DirtFill);
    }
    b.push(Placement::StartCheckpoint {
        x: BLOCK_SIZE,
        y: FLOOR_Y - CHECKPOINT_SIZE,
        activate_on_load: true,
    });

    // Floating island
    let island_y = FLOOR_Y - BLOCK_SIZE * 2.0;
    for i in 9..12 {
        b.block(i as f32, island_y, Terrain::GrassTop);
    }
    b.banana(9.0, island_y);
    b.banana(11.0, island_y);

    // Middle platform
    let middle_y = FLOOR_Y - BLOCK_SIZE * 4.0;
    for i in 15..19 {
        b.block(i as f32, middle_y, Terrain::GrassTop);
    }
    b.banana(16.0, middle_y);
    b.banana(17.0, middle_y);

    // Stepping stones
    let stone1_y = FLOOR_Y - BLOCK_SIZE * 1.5;
    b.block(21.0, stone1_y, Terrain::StoneTop);
    b.banana(21.0, stone1_y);
    b.block(24.0, FLOOR_Y - BLOCK_SIZE * 3.5, Terrain::StoneTop);
    b.block(26.0, FLOOR_Y - BLOCK_SIZE * 2.5, Terrain::StoneTop);

    // Fire gauntlet
    let fire_platform_y = FLOOR_Y - BLOCK_SIZE;
    for i in 28..32 {
        b.block(i as f32, fire_platform_y, Terrain::DirtFill);
    }
    b.banana(28.0, fire_platform_y);
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 29.0,
        y: fire_platform_y - FIRE_HEIGHT,
    });
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 30.0 + FIRE_WIDTH,
        y: fire_platform_y - FIRE_HEIGHT,
    });

    // Spikes platform
    let spike_platform_y = FLOOR_Y - BLOCK_SIZE * 2.0;
    for i in 33..37 {
        b.block(i as f32, spike_platform_y, Terrain::StoneTop);
    }
    let spikes_y = spike_platform_y - BLOCK_SIZE;
    b.push(Placement::Spikes {
        x: BLOCK_SIZE * 34.0,
        y: spikes_y,
    });
    b.push(Placement::Spikes {
        x: BLOCK_SIZE * 35.0,
        y: spikes_y,
    });
    b.banana(33.0, spikes_y);

    // Landing pad between the fire pit and the lava
    b.ground(41.0, Terrain::GrassTop, Terrain::DirtFill);
    b.banana(41.0, FLOOR_Y - 10.0);
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 38.0,
        y: FLOOR_Y - FIRE_HEIGHT,
    });
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 39.0 + FIRE_WIDTH,
        y: FLOOR_Y - FIRE_HEIGHT,
    });

    // Lava pit
    for i in 43..47 {
        b.push(Placement::Lava {
            x: i as f32 * BLOCK_SIZE,
            y: FLOOR_Y,
        });
    }

    // Final platform and goal
    let final_y = FLOOR_Y - BLOCK_SIZE * 2.0;
    for i in 47..50 {
        b.block(i as f32, final_y, Terrain::StoneTop);
    }
    b.push(Placement::EndCheckpoint {
        x: BLOCK_SIZE * 48.0,
        y: final_y - CHECKPOINT_SIZE,
    });

    b.finish(
        LevelId::Level01,
        Vec2::new(BLOCK_SIZE + 20.0, FLOOR_Y - PLAYER_SIZE),
    )
}

fn level_02() -> LevelSpec {
    let mut b = Builder::new();

    // Trap section ground
    for i in 0..8 {
        b.ground(i as f32, Terrain::StoneTop, Terrain::StoneFill);
    }
    let start = Vec2::new(BLOCK_SIZE, FLOOR_Y - PLAYER_SIZE);
    b.push(Placement::StartCheckpoint {
        x: start.x - 50.0,
        y: FLOOR_Y - CHECKPOINT_SIZE,
        activate_on_load: true,
    });

    // High platform over the spike pit
    let platform_y = FLOOR_Y - BLOCK_SIZE * 3.0;
    b.block(3.0, platform_y, Terrain::StoneTop);
    b.banana(3.0, platform_y);

    // Spike pit
    let spikes_y = FLOOR_Y - BLOCK_SIZE;
    b.push(Placement::Spikes {
        x: BLOCK_SIZE * 5.0,
        y: spikes_y,
    });
    b.push(Placement::Spikes {
        x: BLOCK_SIZE * 6.0,
        y: spikes_y,
    });
    b.banana(5.0, spikes_y);

    b.block(7.0, FLOOR_Y, Terrain::StoneTop);
    b.banana(7.0, FLOOR_Y);

    // Boss arena
    for i in 10..=15 {
        b.ground(i as f32, Terrain::StoneTop, Terrain::StoneFill);
    }
    b.block(13.0, FLOOR_Y - BLOCK_SIZE * 2.0, Terrain::StoneTop);
    b.block(11.0, FLOOR_Y - BLOCK_SIZE * 4.0, Terrain::StoneTop);
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 10.0,
        y: FLOOR_Y - FIRE_HEIGHT,
    });
    b.push(Placement::Fire {
        x: BLOCK_SIZE * 15.0,
        y: FLOOR_Y - FIRE_HEIGHT,
    });

    let boss_x = BLOCK_SIZE * 12.0;
    b.push(Placement::Boss {
        x: boss_x,
        y: FLOOR_Y - BOSS_SIZE,
        patrol_start_x: boss_x - BLOCK_SIZE * 1.5,
        patrol_distance: BLOCK_SIZE * 3.0,
    });

    // Hidden goal, moved into the arena when the boss falls
    b.push(Placement::EndCheckpoint {
        x: -500.0,
        y: -500.0,
    });

    b.finish(LevelId::Level02, start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_id_parsing() {
        assert_eq!(LevelId::from_str("level_02"), Some(LevelId::Level02));
        assert_eq!(LevelId::from_str("LEVEL_01"), Some(LevelId::Level01));
        assert_eq!(LevelId::from_str("level_99"), None);
        assert_eq!(LevelId::parse_or_default("level_99"), LevelId::Level01);
    }

    #[test]
    fn test_builtin_levels() {
        let one = LevelSpec::builtin(LevelId::Level01);
        assert!(!one.has_boss());
        assert_eq!(one.player_start, Vec2::new(116.0, 640.0));
        let ends = one
            .placements
            .iter()
            .filter(|p| matches!(p, Placement::EndCheckpoint { .. }))
            .count();
        assert_eq!(ends, 1);

        let two = LevelSpec::builtin(LevelId::Level02);
        assert!(two.has_boss());
        assert!(two.placements.contains(&Placement::Boss {
            x: 1152.0,
            y: 578.0,
            patrol_start_x: 1008.0,
            patrol_distance: 288.0,
        }));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "name": "tiny",
            "player_start": [10.0, 20.0],
            "placements": [
                { "type": "block", "x": 0.0, "y": 704.0 },
                { "type": "block", "x": 96.0, "y": 704.0, "terrain": "ICE_TOP" },
                { "type": "start_checkpoint", "x": 0.0, "y": 576.0 },
                { "type": "end_checkpoint", "x": 96.0, "y": 576.0 }
            ]
        }"#;
        let spec = LevelSpec::from_json(json).expect("valid level");
        assert_eq!(spec.player_start, Vec2::new(10.0, 20.0));
        assert_eq!(
            spec.placements[0],
            Placement::Block {
                x: 0.0,
                y: 704.0,
                terrain: Terrain::GrassTop,
                size: 96.0
            }
        );
        assert!(matches!(
            spec.placements[1],
            Placement::Block {
                terrain: Terrain::IceTop,
                ..
            }
        ));
        assert!(matches!(
            spec.placements[2],
            Placement::StartCheckpoint {
                activate_on_load: false,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_terrain_loads_as_grass() {
        let json = r#"{
            "name": "marble",
            "player_start": [0.0, 0.0],
            "placements": [
                { "type": "block", "x": 0.0, "y": 704.0, "terrain": "MARBLE" },
                { "type": "block", "x": 96.0, "y": 704.0, "terrain": "sand_fill" }
            ]
        }"#;
        let spec = LevelSpec::from_json(json).expect("unknown terrain is not fatal");
        assert!(matches!(
            spec.placements[0],
            Placement::Block {
                terrain: Terrain::GrassTop,
                ..
            }
        ));
        assert!(matches!(
            spec.placements[1],
            Placement::Block {
                terrain: Terrain::SandFill,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(LevelSpec::from_json(r#"{ "name": "x" }"#).is_err());
    }

    #[test]
    fn test_builtin_json_round_trip() {
        let spec = LevelSpec::builtin(LevelId::Level02);
        let json = spec.to_json().expect("serializable");
        assert_eq!(LevelSpec::from_json(&json).expect("parses"), spec);
    }
}

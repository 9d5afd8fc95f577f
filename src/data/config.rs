//! Game configuration
//!
//! Every tunable number in the engine lives here. Missing fields in a RON
//! file fall back to the defaults.

use serde::{Deserialize, Serialize};

use super::enemies::{default_enemy_templates, EnemyTemplate};
use crate::combat::DamageDice;
use crate::ecs::StatBlock;
use crate::error::{GameError, GameResult};
use crate::progression::DepthScaling;
use crate::world::generation::CaveParams;

/// Smallest map side the generator accepts
pub const MIN_MAP_SIDE: i32 = 8;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub cave: CaveParams,
    /// Player sight radius
    pub fov_radius: i32,
    /// How far enemies notice the player
    pub enemy_sight_radius: i32,
    /// Chance an enemy that cannot see the player takes a random step
    pub wander_chance: f64,
    pub player: StatBlock,
    pub enemies: Vec<EnemyTemplate>,
    pub scaling: DepthScaling,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 100,
            map_height: 80,
            cave: CaveParams::default(),
            fov_radius: 8,
            enemy_sight_radius: 8,
            wander_chance: 0.5,
            player: default_player_stats(),
            enemies: default_enemy_templates(),
            scaling: DepthScaling::default(),
        }
    }
}

/// The player's starting stat block
pub fn default_player_stats() -> StatBlock {
    StatBlock::new(24, 14, 5, DamageDice::new(1, 8, 1))
}

impl GameConfig {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> GameResult<()> {
        if self.map_width < MIN_MAP_SIDE || self.map_height < MIN_MAP_SIDE {
            return Err(GameError::Config(format!(
                "map must be at least {}x{}, got {}x{}",
                MIN_MAP_SIDE, MIN_MAP_SIDE, self.map_width, self.map_height
            )));
        }
        for (name, p) in [
            ("cave.wall_probability", self.cave.wall_probability),
            ("cave.min_floor_fraction", self.cave.min_floor_fraction),
            ("wander_chance", self.wander_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GameError::Config(format!("{} must be within [0, 1], got {}", name, p)));
            }
        }
        if self.cave.birth_threshold > 8 || self.cave.survival_threshold > 8 {
            return Err(GameError::Config("cave thresholds cannot exceed 8 neighbours".into()));
        }
        if self.fov_radius <= 0 || self.enemy_sight_radius <= 0 {
            return Err(GameError::Config("sight radii must be positive".into()));
        }
        if self.player.hp <= 0 {
            return Err(GameError::Config("player hp must be positive".into()));
        }
        if let Some(bad) = self.enemies.iter().find(|t| t.stats.hp <= 0) {
            return Err(GameError::Config(format!("{} template has no hit points", bad.kind.name())));
        }
        Ok(())
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str) -> GameResult<Self> {
        let config: GameConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed RON
    pub fn to_ron_string(&self) -> GameResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}

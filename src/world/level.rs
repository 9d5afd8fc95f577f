//! One depth of the dungeon
//!
//! Created on first visit and kept, untouched, until the run ends.

use super::fov::VisitedMask;
use super::generation::GeneratedCave;
use super::map::Map;
use crate::ecs::Position;
use crate::entities::EntityRegistry;

/// Layout, exploration memory and actors of a single depth
pub struct LevelState {
    pub depth: u32,
    pub map: Map,
    /// Tiles the player has ever seen here
    pub visited: VisitedMask,
    pub spawn_point: Position,
    pub stairs_down: Position,
    /// Absent on the first level
    pub stairs_up: Option<Position>,
    pub entities: EntityRegistry,
    pub generation_seed: u64,
    pub used_fallback: bool,
}

impl LevelState {
    /// Wrap a generated layout. No actors yet.
    pub fn from_generated(depth: u32, cave: GeneratedCave, generation_seed: u64) -> Self {
        let visited = VisitedMask::for_map(&cave.map);
        Self {
            depth,
            stairs_up: (depth > 1).then_some(cave.spawn),
            map: cave.map,
            visited,
            spawn_point: cave.spawn,
            stairs_down: cave.stairs_down,
            entities: EntityRegistry::new(depth),
            generation_seed,
            used_fallback: cave.used_fallback,
        }
    }
}

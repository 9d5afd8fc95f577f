//! Procedural map generation
//!
//! Seed derivation, the fallback layout, and the entry point that turns a
//! raw cave into a level-ready layout with stairs stamped in.

pub mod caves;

pub use caves::{generate_caves, CaveParams};

use super::{Map, TileType};
use crate::ecs::Position;

/// A validated layout, ready to become a `LevelState`
#[derive(Debug, Clone)]
pub struct GeneratedCave {
    pub map: Map,
    pub spawn: Position,
    pub stairs_down: Position,
    /// Attempts consumed, including the successful one
    pub attempts: u32,
    /// True when every attempt was rejected and the plain room was used
    pub used_fallback: bool,
}

/// Generate the layout for `depth`: a cave with a StairsDown tile at the
/// exit and, below the first level, a StairsUp tile at the spawn point.
/// `seed` is the run's root seed; the per-depth seed is derived from it.
pub fn generate_level(
    width: i32,
    height: i32,
    depth: u32,
    seed: u64,
    params: &CaveParams,
) -> GeneratedCave {
    let mut cave = generate_caves(width, height, depth, seed, params);
    stamp_stairs(&mut cave, depth);
    cave
}

/// Place stair tiles. Depth 1 has no way up.
fn stamp_stairs(cave: &mut GeneratedCave, depth: u32) {
    if depth > 1 && cave.spawn != cave.stairs_down {
        cave.map.set_tile(cave.spawn.x, cave.spawn.y, TileType::StairsUp);
    }
    cave.map.set_tile(cave.stairs_down.x, cave.stairs_down.y, TileType::StairsDown);
}

/// A guaranteed-valid layout: one open room, spawn and stairs in opposite
/// corners of its interior.
pub fn fallback_room(width: i32, height: i32) -> GeneratedCave {
    let map = Map::open_room(width, height);
    let spawn = Position::new(1.min(map.width - 1), 1.min(map.height - 1));
    let stairs_down = Position::new((map.width - 2).max(spawn.x), (map.height - 2).max(spawn.y));

    GeneratedCave {
        map,
        spawn,
        stairs_down,
        attempts: 0,
        used_fallback: true,
    }
}

/// Derive the generation seed for one depth from the run's root seed
pub fn level_seed(root: u64, depth: u32) -> u64 {
    mix(root ^ mix(depth as u64).rotate_left(17))
}

/// Seed for a retry; attempt 0 uses the level seed itself
pub fn attempt_seed(level_seed: u64, attempt: u32) -> u64 {
    level_seed.wrapping_add(attempt as u64)
}

/// Derive an independent stream seed (combat, population) from a base seed
pub fn stream_seed(base: u64, stream: u64) -> u64 {
    mix(base.wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// SplitMix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_seed_varies_with_depth_and_root() {
        assert_eq!(level_seed(42, 3), level_seed(42, 3));
        assert_ne!(level_seed(42, 3), level_seed(42, 4));
        assert_ne!(level_seed(42, 3), level_seed(43, 3));
        assert_ne!(stream_seed(42, 1), stream_seed(42, 2));
    }

    #[test]
    fn test_stairs_stamped_by_depth() {
        let params = CaveParams::default();
        let top = generate_level(50, 40, 1, 11, &params);
        assert_eq!(top.map.tile_at(top.stairs_down), Some(TileType::StairsDown));
        assert_eq!(top.map.tile_at(top.spawn), Some(TileType::Floor));
        assert!(!top.map.tiles.contains(&TileType::StairsUp));

        let lower = generate_level(50, 40, 2, 11, &params);
        assert_eq!(lower.map.tile_at(lower.spawn), Some(TileType::StairsUp));
        assert_eq!(lower.map.tile_at(lower.stairs_down), Some(TileType::StairsDown));
    }

    #[test]
    fn test_fallback_room_corners() {
        let cave = fallback_room(10, 8);
        assert!(cave.used_fallback);
        assert_eq!(cave.spawn, Position::new(1, 1));
        assert_eq!(cave.stairs_down, Position::new(8, 6));
        assert_eq!(cave.map.walkable_count(), 8 * 6);
    }
}

//! Enemy population
//!
//! Fills a freshly generated level with enemies. Count and strength come
//! from depth scaling; the kind is a weighted pick among templates allowed
//! at that depth.

use rand::seq::SliceRandom;
use rand::Rng;

use super::registry::{EntityId, EntityRegistry};
use crate::data::{eligible_templates, GameConfig};
use crate::ecs::Position;
use crate::world::{Map, TileType};

/// Floor tiles far enough from the spawn point to hold an enemy
pub fn spawn_candidates(map: &Map, spawn: Position, min_distance: i32) -> Vec<Position> {
    map.walkable_positions()
        .into_iter()
        .filter(|pos| map.tile_at(*pos) == Some(TileType::Floor))
        .filter(|pos| pos.chebyshev_distance(&spawn) >= min_distance)
        .collect()
}

/// Spawn the depth's enemies. Deterministic for a given `rng` state.
pub fn populate_level(
    registry: &mut EntityRegistry,
    map: &Map,
    spawn: Position,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> Vec<EntityId> {
    let depth = registry.depth();
    let pool = eligible_templates(&config.enemies, depth);
    if pool.is_empty() {
        log::warn!("No enemy templates allowed at depth {}", depth);
        return Vec::new();
    }

    let mut positions = spawn_candidates(map, spawn, config.scaling.min_spawn_distance);
    positions.shuffle(rng);

    // Don't spawn more enemies than we have positions
    let count = config.scaling.enemy_count(depth).min(positions.len());
    let mut spawned = Vec::with_capacity(count);

    for pos in positions.into_iter().take(count) {
        let Ok(template) = pool.choose_weighted(rng, |t| t.weight) else {
            break;
        };
        match registry.spawn(map, template.kind, pos, config) {
            Ok(entity) => spawned.push(entity),
            Err(e) => log::warn!("Skipped enemy spawn at ({}, {}): {}", pos.x, pos.y, e),
        }
    }

    log::debug!("Populated depth {} with {} enemies", depth, spawned.len());
    spawned
}

//! Player entity creation

use super::registry::{ActorSnapshot, EntityId, EntityRegistry};
use crate::ecs::{Position, StatBlock};
use crate::error::GameResult;
use crate::world::Map;

/// Spawn a fresh player entity at full health
pub fn spawn_player(
    registry: &mut EntityRegistry,
    map: &Map,
    pos: Position,
    stats: StatBlock,
) -> GameResult<EntityId> {
    let entity = registry.place_player(map, &ActorSnapshot::new_player(stats), pos)?;
    log::debug!("Player enters depth {} at ({}, {})", registry.depth(), pos.x, pos.y);
    Ok(entity)
}

/// Where a player arriving at `target` actually ends up: the target itself
/// if free, otherwise the nearest free walkable tile.
pub fn arrival_point(registry: &EntityRegistry, map: &Map, target: Position) -> Option<Position> {
    map.nearest_walkable(target, |pos| registry.occupant_at(pos).is_none())
}

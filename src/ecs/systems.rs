//! ECS Systems
//!
//! Enemy decision making and occupancy queries over a level's world.

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ecs::{AiPolicy, Direction, Kind, Position};
use crate::world::{field_of_view, Map};

/// What an enemy decided to do with its turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    /// Adjacent to the player: attack instead of moving
    Attack { attacker: Entity, target: Entity },
    /// Player in sight: step toward them
    Chase { entity: Entity, from: Position, to: Position },
    /// Player out of sight: random step
    Wander { entity: Entity, from: Position, to: Position },
    /// Nothing useful to do, or boxed in
    Idle { entity: Entity },
}

/// Perception and temperament for a single enemy step
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub sight_radius: i32,
    pub wander_chance: f64,
}

/// Entity standing on `pos`, if any
pub fn occupant_at(world: &World, pos: Position) -> Option<Entity> {
    world
        .query::<&Position>()
        .iter()
        .find(|(_, p)| **p == pos)
        .map(|(entity, _)| entity)
}

/// Walkable and not occupied
pub fn is_free(world: &World, map: &Map, pos: Position) -> bool {
    map.is_walkable(pos.x, pos.y) && occupant_at(world, pos).is_none()
}

/// Whether `viewer` can see `target` under the same shadowcasting rule the
/// player's view uses
pub fn can_see(map: &Map, viewer: Position, target: Position, radius: i32) -> bool {
    if viewer.chebyshev_distance(&target) > radius {
        return false;
    }
    field_of_view(map, viewer, radius).contains(&target)
}

/// Decide one enemy's turn. Does not mutate the world.
pub fn plan_enemy_step(
    world: &World,
    map: &Map,
    entity: Entity,
    player: Entity,
    player_pos: Position,
    params: StepParams,
    rng: &mut impl Rng,
) -> EnemyAction {
    let Ok(from) = world.get::<&Position>(entity).map(|p| *p) else {
        return EnemyAction::Idle { entity };
    };
    let policy = world
        .get::<&Kind>(entity)
        .map(|k| k.0.ai_policy())
        .unwrap_or(AiPolicy::None);

    if policy == AiPolicy::None {
        return EnemyAction::Idle { entity };
    }

    if can_see(map, from, player_pos, params.sight_radius) {
        if from.chebyshev_distance(&player_pos) <= 1 {
            return EnemyAction::Attack { attacker: entity, target: player };
        }
        return match chase_step(from, player_pos, |p| is_free(world, map, p)) {
            Some(to) => EnemyAction::Chase { entity, from, to },
            None => EnemyAction::Idle { entity },
        };
    }

    if rng.gen_bool(params.wander_chance.clamp(0.0, 1.0)) {
        if let Some(to) = wander_step(from, rng, |p| is_free(world, map, p)) {
            return EnemyAction::Wander { entity, from, to };
        }
    }

    EnemyAction::Idle { entity }
}

/// Greedy step that strictly reduces Chebyshev distance to `target`.
///
/// Tries the diagonal first, then the axis with the larger delta, then the
/// other axis. On equal deltas the x axis goes first.
pub fn chase_step(
    from: Position,
    target: Position,
    is_free: impl Fn(Position) -> bool,
) -> Option<Position> {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    let (sx, sy) = (dx.signum(), dy.signum());

    if sx == 0 && sy == 0 {
        return None; // Already at target
    }

    let mut candidates = Vec::with_capacity(3);
    if sx != 0 && sy != 0 {
        candidates.push((sx, sy));
    }
    if dx.abs() >= dy.abs() {
        candidates.push((sx, 0));
        candidates.push((0, sy));
    } else {
        candidates.push((0, sy));
        candidates.push((sx, 0));
    }

    let current = from.chebyshev_distance(&target);
    candidates
        .into_iter()
        .filter(|&(cx, cy)| cx != 0 || cy != 0)
        .map(|(cx, cy)| from.offset(cx, cy))
        .find(|pos| pos.chebyshev_distance(&target) < current && is_free(*pos))
}

/// Random passable neighbouring tile
pub fn wander_step(
    from: Position,
    rng: &mut impl Rng,
    is_free: impl Fn(Position) -> bool,
) -> Option<Position> {
    let options: Vec<Position> = Direction::ALL
        .iter()
        .map(|d| {
            let (dx, dy) = d.delta();
            from.offset(dx, dy)
        })
        .filter(|p| is_free(*p))
        .collect();
    options.choose(rng).copied()
}

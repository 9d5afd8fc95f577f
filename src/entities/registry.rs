//! Per-level actor registry
//!
//! Wraps one `hecs::World` per level. All placement and movement goes
//! through here so the one-actor-per-tile rule holds.

use hecs::{Entity, World};
use rand::Rng;

use crate::combat::Combatant;
use crate::data::{enemies::template_for, GameConfig};
use crate::ecs::systems::{self, EnemyAction, StepParams};
use crate::ecs::{
    CombatStats, Enemy, EntityKind, Experience, Health, Kind, Player, Position, SpawnOrder,
    StatBlock, XpReward,
};
use crate::error::{GameError, GameResult};
use crate::world::{Map, TileType};

/// Handle to an actor within one level's registry
pub type EntityId = Entity;

/// Why a move did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    Wall,
    OutOfBounds,
    /// Another actor stands there; hostile occupants invite an attack
    Occupied(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Blocked(Obstacle),
}

/// Read-only view of one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub health: Health,
    pub stats: CombatStats,
    pub spawn_order: u64,
}

/// Everything needed to recreate an actor in another level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorSnapshot {
    pub kind: EntityKind,
    pub health: Health,
    pub stats: CombatStats,
    pub experience: Experience,
}

impl ActorSnapshot {
    /// A fresh player at full health
    pub fn new_player(stats: StatBlock) -> Self {
        Self {
            kind: EntityKind::Player,
            health: stats.health(),
            stats: stats.combat(),
            experience: Experience::default(),
        }
    }
}

pub(crate) fn missing(id: EntityId) -> GameError {
    GameError::EntityNotFound(id.to_bits().get())
}

/// Actors living on one level
pub struct EntityRegistry {
    world: World,
    depth: u32,
    next_order: u64,
}

impl EntityRegistry {
    pub fn new(depth: u32) -> Self {
        Self {
            world: World::new(),
            depth,
            next_order: 0,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Underlying world, for read-only queries
    pub fn world(&self) -> &World {
        &self.world
    }

    fn next_spawn_order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next_order);
        self.next_order += 1;
        order
    }

    /// Spawn an actor of `kind` with stats taken from config and scaled to
    /// this level's depth. Only plain Floor tiles are accepted.
    pub fn spawn(
        &mut self,
        map: &Map,
        kind: EntityKind,
        pos: Position,
        config: &GameConfig,
    ) -> GameResult<EntityId> {
        if kind == EntityKind::Player {
            self.check_placement(map, pos, |tile| tile == TileType::Floor)?;
            return self.place_player(map, &ActorSnapshot::new_player(config.player), pos);
        }

        let template = template_for(&config.enemies, kind).ok_or_else(|| {
            GameError::Config(format!("no enemy template for {}", kind.name()))
        })?;
        let stats = config.scaling.scale_stats(template.stats, self.depth);
        let xp = config.scaling.scale_xp(template.xp_value, self.depth);
        self.spawn_enemy(map, kind, pos, stats, xp)
    }

    /// Spawn an enemy with an explicit stat block. Only plain Floor tiles
    /// are accepted.
    pub fn spawn_enemy(
        &mut self,
        map: &Map,
        kind: EntityKind,
        pos: Position,
        stats: StatBlock,
        xp: u32,
    ) -> GameResult<EntityId> {
        self.check_placement(map, pos, |tile| tile == TileType::Floor)?;
        let order = self.next_spawn_order();
        let entity = self.world.spawn((
            pos,
            Kind(kind),
            Enemy,
            order,
            stats.health(),
            stats.combat(),
            XpReward(xp),
        ));
        log::trace!("Spawned {} at ({}, {}) on depth {}", kind.name(), pos.x, pos.y, self.depth);
        Ok(entity)
    }

    /// Put the player into this level. Any walkable tile is allowed, so
    /// arrival on stairs works.
    pub fn place_player(
        &mut self,
        map: &Map,
        snapshot: &ActorSnapshot,
        pos: Position,
    ) -> GameResult<EntityId> {
        self.check_placement(map, pos, |tile| tile.is_walkable())?;
        let order = self.next_spawn_order();
        Ok(self.world.spawn((
            pos,
            Kind(EntityKind::Player),
            Player,
            order,
            snapshot.health,
            snapshot.stats,
            snapshot.experience,
        )))
    }

    fn check_placement(
        &self,
        map: &Map,
        pos: Position,
        accept: impl Fn(TileType) -> bool,
    ) -> GameResult<()> {
        match map.tile_at(pos) {
            Some(tile) if accept(tile) && self.occupant_at(pos).is_none() => Ok(()),
            _ => Err(GameError::InvalidPlacement(pos)),
        }
    }

    /// Delete an actor, returning what it was
    pub fn remove(&mut self, id: EntityId) -> GameResult<ActorSnapshot> {
        let view = self.get(id)?;
        let experience = self.world.get::<&Experience>(id).map(|e| *e).unwrap_or_default();
        self.world.despawn(id).map_err(|_| missing(id))?;
        Ok(ActorSnapshot {
            kind: view.kind,
            health: view.health,
            stats: view.stats,
            experience,
        })
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.world.contains(id)
    }

    pub fn get(&self, id: EntityId) -> GameResult<ActorView> {
        let mut query = self
            .world
            .query_one::<(&Kind, &Position, &Health, &CombatStats, &SpawnOrder)>(id)
            .map_err(|_| missing(id))?;
        let (kind, position, health, stats, order) = query.get().ok_or_else(|| missing(id))?;
        Ok(ActorView {
            id,
            kind: kind.0,
            position: *position,
            health: *health,
            stats: *stats,
            spawn_order: order.0,
        })
    }

    pub fn position(&self, id: EntityId) -> GameResult<Position> {
        self.world.get::<&Position>(id).map(|p| *p).map_err(|_| missing(id))
    }

    pub fn health(&self, id: EntityId) -> GameResult<Health> {
        self.world.get::<&Health>(id).map(|h| *h).map_err(|_| missing(id))
    }

    pub fn set_health(&mut self, id: EntityId, health: Health) -> GameResult<()> {
        let mut current = self.world.get::<&mut Health>(id).map_err(|_| missing(id))?;
        *current = health;
        Ok(())
    }

    /// Health and combat numbers, as the attack roll wants them
    pub fn combatant(&self, id: EntityId) -> GameResult<Combatant> {
        let view = self.get(id)?;
        Ok(Combatant::new(view.health, view.stats))
    }

    pub fn kind(&self, id: EntityId) -> GameResult<EntityKind> {
        self.world.get::<&Kind>(id).map(|k| k.0).map_err(|_| missing(id))
    }

    /// XP this actor is worth when killed
    pub fn xp_reward(&self, id: EntityId) -> u32 {
        self.world.get::<&XpReward>(id).map(|x| x.0).unwrap_or(0)
    }

    pub fn experience(&self, id: EntityId) -> GameResult<Experience> {
        self.world.get::<&Experience>(id).map(|e| *e).map_err(|_| missing(id))
    }

    /// Add XP to an actor that tracks experience. Returns the new total.
    pub fn grant_xp(&mut self, id: EntityId, amount: u32) -> GameResult<u32> {
        let mut experience = self.world.get::<&mut Experience>(id).map_err(|_| missing(id))?;
        experience.gain(amount);
        Ok(experience.xp)
    }

    /// The player, if they are on this level
    pub fn player(&self) -> Option<EntityId> {
        self.world
            .query::<&Player>()
            .iter()
            .map(|(entity, _)| entity)
            .next()
    }

    pub fn occupant_at(&self, pos: Position) -> Option<EntityId> {
        systems::occupant_at(&self.world, pos)
    }

    pub fn is_free(&self, map: &Map, pos: Position) -> bool {
        systems::is_free(&self.world, map, pos)
    }

    /// Step an actor by `(dx, dy)`. Walls, the map edge and other actors
    /// block; nothing changes when blocked.
    pub fn move_by(&mut self, id: EntityId, dx: i32, dy: i32, map: &Map) -> GameResult<MoveOutcome> {
        let from = self.position(id)?;
        let to = from.offset(dx, dy);

        if !map.contains(to) {
            return Ok(MoveOutcome::Blocked(Obstacle::OutOfBounds));
        }
        if !map.is_walkable(to.x, to.y) {
            return Ok(MoveOutcome::Blocked(Obstacle::Wall));
        }
        if let Some(occupant) = self.occupant_at(to).filter(|&e| e != id) {
            return Ok(MoveOutcome::Blocked(Obstacle::Occupied(occupant)));
        }

        self.set_position(id, to)?;
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Move an actor straight to `to`, ignoring distance. The tile must be
    /// walkable and free.
    pub fn teleport(&mut self, id: EntityId, map: &Map, to: Position) -> GameResult<()> {
        if !map.is_walkable(to.x, to.y) || self.occupant_at(to).is_some_and(|e| e != id) {
            return Err(GameError::InvalidPlacement(to));
        }
        self.set_position(id, to)
    }

    fn set_position(&mut self, id: EntityId, to: Position) -> GameResult<()> {
        let mut pos = self.world.get::<&mut Position>(id).map_err(|_| missing(id))?;
        *pos = to;
        Ok(())
    }

    /// Living enemies, ascending spawn order
    pub fn enemies_in_spawn_order(&self) -> Vec<EntityId> {
        let mut enemies: Vec<(u64, EntityId)> = self
            .world
            .query::<(&Enemy, &SpawnOrder, &Health)>()
            .iter()
            .filter(|(_, (_, _, health))| !health.is_dead())
            .map(|(entity, (_, order, _))| (order.0, entity))
            .collect();
        enemies.sort_unstable();
        enemies.into_iter().map(|(_, entity)| entity).collect()
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<&Enemy>().iter().count()
    }

    /// Every actor, ascending spawn order
    pub fn actors(&self) -> Vec<ActorView> {
        let mut actors: Vec<ActorView> = self
            .world
            .query::<(&Kind, &Position, &Health, &CombatStats, &SpawnOrder)>()
            .iter()
            .map(|(id, (kind, position, health, stats, order))| ActorView {
                id,
                kind: kind.0,
                position: *position,
                health: *health,
                stats: *stats,
                spawn_order: order.0,
            })
            .collect();
        actors.sort_unstable_by_key(|a| a.spawn_order);
        actors
    }

    /// Run one enemy's turn: decide, then carry out any movement. Attacks
    /// are returned for the caller to resolve.
    pub fn enemy_step(
        &mut self,
        id: EntityId,
        player: EntityId,
        player_pos: Position,
        map: &Map,
        params: StepParams,
        rng: &mut impl Rng,
    ) -> GameResult<EnemyAction> {
        if !self.contains(id) {
            return Err(missing(id));
        }
        let action = systems::plan_enemy_step(&self.world, map, id, player, player_pos, params, rng);
        match action {
            EnemyAction::Chase { entity, to, .. } | EnemyAction::Wander { entity, to, .. } => {
                self.set_position(entity, to)?;
            }
            EnemyAction::Attack { .. } | EnemyAction::Idle { .. } => {}
        }
        Ok(action)
    }
}

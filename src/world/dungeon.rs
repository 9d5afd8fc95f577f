//! The whole dungeon
//!
//! Holds every level visited this run, keyed by depth, and moves the
//! player between them. Levels are generated on first visit and never
//! regenerated.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::generation::{generate_level, level_seed, stream_seed};
use super::level::LevelState;
use super::tile::TileType;
use crate::data::GameConfig;
use crate::ecs::Position;
use crate::entities::{arrival_point, populate_level, spawn_player, EntityId};
use crate::error::{GameError, GameResult};

/// Stream id for enemy population, derived from the level seed
const POPULATION_STREAM: u64 = 1;

/// Which staircase the player is taking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairDirection {
    Down,
    Up,
}

/// Outcome of a successful depth change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from_depth: u32,
    pub to_depth: u32,
    pub arrival: Position,
    /// True when the level was generated by this transition
    pub new_level: bool,
}

/// Every level of the current run plus where the player is
pub struct WorldState {
    levels: BTreeMap<u32, LevelState>,
    current_depth: u32,
    turn_counter: u64,
    rng_seed_root: u64,
    deepest: u32,
    player: EntityId,
    config: GameConfig,
}

impl WorldState {
    /// Start a run: generate depth 1 and put the player on its spawn point
    pub fn new(seed: u64, config: GameConfig) -> GameResult<Self> {
        config.validate()?;
        let mut level = create_level(&config, seed, 1);
        let player = spawn_player(&mut level.entities, &level.map, level.spawn_point, config.player)?;

        let mut levels = BTreeMap::new();
        levels.insert(1, level);

        Ok(Self {
            levels,
            current_depth: 1,
            turn_counter: 0,
            rng_seed_root: seed,
            deepest: 1,
            player,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng_seed_root
    }

    pub fn current_depth(&self) -> u32 {
        self.current_depth
    }

    /// Deepest depth reached this run
    pub fn deepest_depth(&self) -> u32 {
        self.deepest
    }

    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    /// Advance the turn counter by one round
    pub fn advance_turn(&mut self) -> u64 {
        self.turn_counter += 1;
        self.turn_counter
    }

    /// The player's handle in the current level's registry
    pub fn player(&self) -> EntityId {
        self.player
    }

    pub fn player_position(&self) -> GameResult<Position> {
        self.current_level()?.entities.position(self.player)
    }

    pub fn has_level(&self, depth: u32) -> bool {
        self.levels.contains_key(&depth)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, depth: u32) -> GameResult<&LevelState> {
        self.levels.get(&depth).ok_or(GameError::LevelNotFound(depth))
    }

    pub fn level_mut(&mut self, depth: u32) -> GameResult<&mut LevelState> {
        self.levels.get_mut(&depth).ok_or(GameError::LevelNotFound(depth))
    }

    pub fn current_level(&self) -> GameResult<&LevelState> {
        self.level(self.current_depth)
    }

    pub fn current_level_mut(&mut self) -> GameResult<&mut LevelState> {
        self.level_mut(self.current_depth)
    }

    /// The level at `depth`, generating and populating it on first request
    pub fn get_or_create_level(&mut self, depth: u32) -> GameResult<&mut LevelState> {
        if depth == 0 {
            return Err(GameError::LevelNotFound(depth));
        }
        if !self.levels.contains_key(&depth) {
            let level = create_level(&self.config, self.rng_seed_root, depth);
            self.levels.insert(depth, level);
        }
        self.level_mut(depth)
    }

    /// Take the stairs under the player.
    ///
    /// Going down arrives at the lower level's spawn point; going up
    /// arrives on the upper level's stairs down. An occupied arrival tile
    /// shifts the player to the nearest free walkable tile.
    pub fn transition_player(&mut self, direction: StairDirection) -> GameResult<Transition> {
        let from_depth = self.current_depth;
        let from = self.player_position()?;
        let tile = self.current_level()?.map.tile_at(from);

        let to_depth = match direction {
            StairDirection::Down if tile == Some(TileType::StairsDown) => from_depth + 1,
            StairDirection::Up if tile == Some(TileType::StairsUp) && from_depth > 1 => from_depth - 1,
            StairDirection::Down => {
                return Err(GameError::InvalidIntent("There are no stairs down here.".into()))
            }
            StairDirection::Up => {
                return Err(GameError::InvalidIntent("There are no stairs up here.".into()))
            }
        };

        let new_level = !self.has_level(to_depth);
        let target = self.get_or_create_level(to_depth)?;
        let landing = match direction {
            StairDirection::Down => target.spawn_point,
            StairDirection::Up => target.stairs_down,
        };
        let arrival = arrival_point(&target.entities, &target.map, landing)
            .ok_or(GameError::InvalidPlacement(landing))?;

        let player = self.player;
        let snapshot = self.current_level_mut()?.entities.remove(player)?;
        let target = self.level_mut(to_depth)?;
        let player = target.entities.place_player(&target.map, &snapshot, arrival)?;
        self.player = player;
        self.current_depth = to_depth;
        self.deepest = self.deepest.max(to_depth);

        log::info!(
            "Player moved from depth {} to depth {} at ({}, {})",
            from_depth,
            to_depth,
            arrival.x,
            arrival.y
        );

        Ok(Transition { from_depth, to_depth, arrival, new_level })
    }
}

/// Generate and populate a level. Deterministic for `(config, root, depth)`.
fn create_level(config: &GameConfig, root: u64, depth: u32) -> LevelState {
    let seed = level_seed(root, depth);
    let cave = generate_level(config.map_width, config.map_height, depth, root, &config.cave);
    let attempts = cave.attempts;
    let mut level = LevelState::from_generated(depth, cave, seed);

    let mut rng = StdRng::seed_from_u64(stream_seed(seed, POPULATION_STREAM));
    let enemies = populate_level(&mut level.entities, &level.map, level.spawn_point, config, &mut rng);

    log::info!(
        "Generated depth {} ({} attempts{}, {} enemies)",
        depth,
        attempts,
        if level.used_fallback { ", fallback room" } else { "" },
        enemies.len()
    );
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ActorView;

    fn small_config() -> GameConfig {
        GameConfig {
            map_width: 50,
            map_height: 40,
            ..GameConfig::default()
        }
    }

    fn enemies(level: &LevelState) -> Vec<ActorView> {
        level
            .entities
            .actors()
            .into_iter()
            .filter(|a| a.kind.is_hostile())
            .collect()
    }

    /// Put the player on the current level's stairs down
    fn walk_to_stairs(world: &mut WorldState) {
        let player = world.player();
        let level = world.current_level_mut().unwrap();
        let stairs = level.stairs_down;
        if let Some(blocker) = level.entities.occupant_at(stairs).filter(|&e| e != player) {
            level.entities.remove(blocker).unwrap();
        }
        level.entities.teleport(player, &level.map, stairs).unwrap();
    }

    #[test]
    fn test_new_world_starts_on_spawn() {
        let world = WorldState::new(42, small_config()).unwrap();
        let level = world.current_level().unwrap();
        assert_eq!(world.current_depth(), 1);
        assert_eq!(world.turn_counter(), 0);
        assert_eq!(world.player_position().unwrap(), level.spawn_point);
        assert!(!enemies(level).is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig { map_width: 3, ..GameConfig::default() };
        assert!(matches!(WorldState::new(1, config), Err(GameError::Config(_))));
    }

    #[test]
    fn test_transition_off_stairs_rejected() {
        let mut world = WorldState::new(42, small_config()).unwrap();
        let before = world.player_position().unwrap();

        let down = world.transition_player(StairDirection::Down);
        assert!(matches!(down, Err(GameError::InvalidIntent(_))));
        let up = world.transition_player(StairDirection::Up);
        assert!(matches!(up, Err(GameError::InvalidIntent(_))));

        assert_eq!(world.current_depth(), 1);
        assert_eq!(world.player_position().unwrap(), before);
        assert_eq!(world.level_count(), 1);
    }

    #[test]
    fn test_descend_then_ascend_returns_to_stairs() {
        let mut world = WorldState::new(7, small_config()).unwrap();
        walk_to_stairs(&mut world);
        let stairs = world.current_level().unwrap().stairs_down;

        let down = world.transition_player(StairDirection::Down).unwrap();
        assert!(down.new_level);
        assert_eq!(world.current_depth(), 2);
        let lower = world.current_level().unwrap();
        assert_eq!(down.arrival, lower.spawn_point);
        assert_eq!(lower.map.tile_at(down.arrival), Some(TileType::StairsUp));

        let up = world.transition_player(StairDirection::Up).unwrap();
        assert!(!up.new_level);
        assert_eq!(world.current_depth(), 1);
        assert_eq!(world.player_position().unwrap(), stairs);
        assert_eq!(world.deepest_depth(), 2);
    }

    #[test]
    fn test_levels_persist_exactly() {
        let mut world = WorldState::new(99, small_config()).unwrap();

        // Leave a mark on depth 1: explore a little and kill one enemy
        let (map_before, visited_before, enemies_before) = {
            let level = world.current_level_mut().unwrap();
            level.visited.mark(level.spawn_point);
            let victim = enemies(level)[0].id;
            level.entities.remove(victim).unwrap();
            (level.map.clone(), level.visited.clone(), enemies(level))
        };
        walk_to_stairs(&mut world);
        let map_before_descent = world.current_level().unwrap().map.clone();
        assert_eq!(map_before, map_before_descent);

        world.transition_player(StairDirection::Down).unwrap();
        let lower_seed = world.current_level().unwrap().generation_seed;
        world.transition_player(StairDirection::Up).unwrap();

        let level = world.current_level().unwrap();
        assert_eq!(level.map, map_before);
        assert_eq!(level.visited, visited_before);
        assert_eq!(enemies(level), enemies_before);

        // Second descent reuses the stored level
        world.transition_player(StairDirection::Down).unwrap();
        assert_eq!(world.current_level().unwrap().generation_seed, lower_seed);
        assert_eq!(world.level_count(), 2);
    }

    #[test]
    fn test_get_or_create_is_deterministic() {
        let mut a = WorldState::new(5, small_config()).unwrap();
        let mut b = WorldState::new(5, small_config()).unwrap();
        let left = a.get_or_create_level(4).unwrap();
        let (map, enemies_left) = (left.map.clone(), enemies(left).len());
        let right = b.get_or_create_level(4).unwrap();
        assert_eq!(right.map, map);
        assert_eq!(enemies(right).len(), enemies_left);
        assert!(a.get_or_create_level(0).is_err());
    }

    #[test]
    fn test_occupied_arrival_shifts_player() {
        let mut world = WorldState::new(11, small_config()).unwrap();
        walk_to_stairs(&mut world);
        world.transition_player(StairDirection::Down).unwrap();
        world.transition_player(StairDirection::Up).unwrap();

        // Park an enemy on depth 2's spawn point, then descend again
        let config = world.config().clone();
        let lower = world.level_mut(2).unwrap();
        let spawn = lower.spawn_point;
        let free = lower
            .map
            .walkable_positions()
            .into_iter()
            .find(|p| lower.map.tile_at(*p) == Some(TileType::Floor) && lower.entities.occupant_at(*p).is_none())
            .unwrap();
        let goblin = lower
            .entities
            .spawn_enemy(&lower.map, crate::ecs::EntityKind::Goblin, free, config.player, 0)
            .unwrap();
        lower.entities.teleport(goblin, &lower.map, spawn).unwrap();

        let down = world.transition_player(StairDirection::Down).unwrap();
        assert_ne!(down.arrival, spawn);
        assert_eq!(down.arrival.chebyshev_distance(&spawn), 1);
    }
}

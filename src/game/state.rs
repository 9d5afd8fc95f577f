//! Turn scheduler
//!
//! Drives one round per player intent: resolve the player's action, let
//! every enemy act, refresh visibility, advance the turn counter, then
//! check for death. Rejected intents change nothing.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::messages::{GameMessage, MessageCategory, MessageLog, RunStats};
use super::snapshot::{EntityView, LevelMap, PlayerView, RenderSnapshot, TileView};
use super::turn::{Intent, TurnPhase, TurnResult};
use crate::combat::{describe_attack, resolve_attack, DiceRoller};
use crate::data::GameConfig;
use crate::ecs::{EnemyAction, EntityKind, Health, Position, StepParams};
use crate::entities::{EntityId, MoveOutcome, Obstacle};
use crate::error::{GameError, GameResult};
use crate::world::generation::stream_seed;
use crate::world::{
    classify, compute_visible, StairDirection, TileType, VisibilityClass, VisibleSet, WorldState,
};

/// Stream ids derived from the run seed
const COMBAT_STREAM: u64 = 0xC0;
const AI_STREAM: u64 = 0xA1;

/// The main game struct that holds all game data
pub struct Game<R: DiceRoller = StdRng> {
    world: WorldState,
    phase: TurnPhase,
    /// Tiles in the player's sight after the last refresh
    visible: VisibleSet,
    /// Dice for every attack roll
    roller: R,
    /// Wander decisions
    ai_rng: StdRng,
    messages: MessageLog,
    stats: RunStats,
}

/// Narrated events of the round being resolved
type Events = Vec<(MessageCategory, String)>;

impl Game<StdRng> {
    /// Start a seeded run. Combat dice come from a stream of `seed`.
    pub fn new(seed: u64, config: GameConfig) -> GameResult<Self> {
        let roller = StdRng::seed_from_u64(stream_seed(seed, COMBAT_STREAM));
        Self::with_roller(seed, config, roller)
    }
}

impl<R: DiceRoller> Game<R> {
    /// Start a seeded run with an explicit dice source
    pub fn with_roller(seed: u64, config: GameConfig, roller: R) -> GameResult<Self> {
        let world = WorldState::new(seed, config)?;
        let mut game = Self {
            world,
            phase: TurnPhase::AwaitingInput,
            visible: VisibleSet::new(),
            roller,
            ai_rng: StdRng::seed_from_u64(stream_seed(seed, AI_STREAM)),
            messages: MessageLog::new(),
            stats: RunStats { deepest_depth: 1, ..RunStats::default() },
        };
        game.refresh_visibility()?;
        game.messages.push(
            "You enter the caves. Find the stairs down.",
            MessageCategory::System,
            0,
        );
        log::info!("New run with seed {}", seed);
        Ok(game)
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == TurnPhase::GameOver
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable access for tooling and tests; rounds should go through
    /// [`Game::apply_intent`]
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn messages(&self) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter()
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn depth(&self) -> u32 {
        self.world.current_depth()
    }

    pub fn turn(&self) -> u64 {
        self.world.turn_counter()
    }

    pub fn player(&self) -> EntityId {
        self.world.player()
    }

    pub fn player_position(&self) -> GameResult<Position> {
        self.world.player_position()
    }

    pub fn player_health(&self) -> GameResult<Health> {
        self.world.current_level()?.entities.health(self.world.player())
    }

    /// Run one round for `intent`.
    ///
    /// Rejected intents come back as `accepted: false` with the reason;
    /// the board and the turn counter are untouched. `Err` means a defect,
    /// not a bad move, and leaves the round unfinished.
    pub fn apply_intent(&mut self, intent: Intent) -> GameResult<TurnResult> {
        if !self.phase.accepts_input() {
            let game_over = self.phase == TurnPhase::GameOver;
            let reason = if game_over { "You are dead." } else { "The last round never finished." };
            return Ok(TurnResult::rejected(reason, game_over));
        }

        let mut events = Events::new();
        self.set_phase(TurnPhase::ResolvingPlayerAction);
        if let Err(e) = self.resolve_player_action(intent, &mut events) {
            self.set_phase(TurnPhase::AwaitingInput);
            if !e.is_rejection() {
                return Err(e);
            }
            let reason = match e {
                GameError::InvalidIntent(reason) => reason,
                other => other.to_string(),
            };
            self.messages.push(reason.clone(), MessageCategory::Warning, self.turn());
            log::debug!("Rejected {:?}: {}", intent, reason);
            return Ok(TurnResult::rejected(reason, false));
        }

        self.set_phase(TurnPhase::EnemyPhase);
        self.run_enemy_phase(&mut events)?;

        self.set_phase(TurnPhase::VisibilityRefresh);
        self.refresh_visibility()?;
        let turn = self.world.advance_turn();

        let game_over = self.player_health()?.is_dead();
        if game_over {
            events.push((
                MessageCategory::System,
                format!("You die on depth {}.", self.depth()),
            ));
            log::info!("Game over on depth {} after {} turns", self.depth(), turn);
            self.set_phase(TurnPhase::GameOver);
        } else {
            self.set_phase(TurnPhase::AwaitingInput);
        }

        // Events belong to the round they happened in
        for (category, text) in &events {
            self.messages.push(text.clone(), *category, turn - 1);
        }
        log::debug!("Turn {} resolved with {} events", turn, events.len());

        Ok(TurnResult::completed(
            events.into_iter().map(|(_, text)| text).collect(),
            game_over,
        ))
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        log::trace!("Phase transition: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn resolve_player_action(&mut self, intent: Intent, events: &mut Events) -> GameResult<()> {
        match intent {
            Intent::Move(direction) => {
                let (dx, dy) = direction.delta();
                let player = self.world.player();
                let level = self.world.current_level_mut()?;
                let target = level.entities.position(player)?.offset(dx, dy);

                if let Some(occupant) = level.entities.occupant_at(target) {
                    if level.entities.kind(occupant)?.is_hostile() {
                        return self.player_attack(occupant, events);
                    }
                }

                match level.entities.move_by(player, dx, dy, &level.map)? {
                    MoveOutcome::Moved { to, .. } => {
                        self.stats.steps_taken += 1;
                        if let Some(tile) = level.map.tile_at(to).filter(|t| t.is_stairs()) {
                            let way = if tile == TileType::StairsDown { "down" } else { "up" };
                            events.push((
                                MessageCategory::Movement,
                                format!("There is a staircase leading {} here.", way),
                            ));
                        }
                        Ok(())
                    }
                    MoveOutcome::Blocked(Obstacle::Wall | Obstacle::OutOfBounds) => {
                        Err(GameError::InvalidIntent("You can't go that way.".into()))
                    }
                    MoveOutcome::Blocked(Obstacle::Occupied(_)) => {
                        Err(GameError::InvalidIntent("Something is in the way.".into()))
                    }
                }
            }
            Intent::UseStairs => {
                let level = self.world.current_level()?;
                let underfoot = level.map.tile_at(level.entities.position(self.world.player())?);
                let direction = match underfoot {
                    Some(TileType::StairsDown) => StairDirection::Down,
                    Some(TileType::StairsUp) => StairDirection::Up,
                    _ => return Err(GameError::InvalidIntent("There are no stairs here.".into())),
                };

                let transition = self.world.transition_player(direction)?;
                self.stats.deepest_depth = self.world.deepest_depth();
                let text = match direction {
                    StairDirection::Down if transition.new_level => {
                        format!("You descend to depth {}.", transition.to_depth)
                    }
                    StairDirection::Down => format!("You return to depth {}.", transition.to_depth),
                    StairDirection::Up => format!("You climb back up to depth {}.", transition.to_depth),
                };
                events.push((MessageCategory::System, text));
                Ok(())
            }
            Intent::Wait => {
                events.push((MessageCategory::Movement, "You wait.".into()));
                Ok(())
            }
        }
    }

    /// Player attacks `target`; a kill removes it and pays out its XP
    fn player_attack(&mut self, target: EntityId, events: &mut Events) -> GameResult<()> {
        let player = self.world.player();
        let level = self.world.current_level_mut()?;
        let attacker = level.entities.combatant(player)?;
        let defender = level.entities.combatant(target)?;
        let kind = level.entities.kind(target)?;

        let result = resolve_attack(&attacker, &defender, &mut self.roller);
        level
            .entities
            .set_health(target, Health { current: result.defender_hp_after, ..defender.health })?;
        self.stats.damage_dealt += (defender.health.current - result.defender_hp_after) as u64;
        events.push((
            MessageCategory::Combat,
            describe_attack(&actor_name(EntityKind::Player), &actor_name(kind), &result),
        ));

        if result.defender_died {
            let xp = level.entities.xp_reward(target);
            level.entities.remove(target)?;
            let total = level.entities.grant_xp(player, xp)?;
            self.stats.enemies_slain += 1;
            events.push((
                MessageCategory::Combat,
                format!("You gain {} experience ({} total).", xp, total),
            ));
        }
        Ok(())
    }

    /// Every living enemy takes one step, in spawn order. A dead player
    /// does not cut the phase short.
    fn run_enemy_phase(&mut self, events: &mut Events) -> GameResult<()> {
        let player = self.world.player();
        let params = StepParams {
            sight_radius: self.world.config().enemy_sight_radius,
            wander_chance: self.world.config().wander_chance,
        };
        let order = self.world.current_level()?.entities.enemies_in_spawn_order();

        for enemy in order {
            let level = self.world.current_level_mut()?;
            if !level.entities.contains(enemy) || level.entities.health(enemy)?.is_dead() {
                continue;
            }
            let player_pos = level.entities.position(player)?;
            let action = level.entities.enemy_step(
                enemy,
                player,
                player_pos,
                &level.map,
                params,
                &mut self.ai_rng,
            )?;

            if let EnemyAction::Attack { attacker, target } = action {
                self.enemy_attack(attacker, target, events)?;
            }
        }
        Ok(())
    }

    fn enemy_attack(&mut self, attacker: EntityId, target: EntityId, events: &mut Events) -> GameResult<()> {
        let level = self.world.current_level_mut()?;
        let offense = level.entities.combatant(attacker)?;
        let defense = level.entities.combatant(target)?;
        let kind = level.entities.kind(attacker)?;

        let result = resolve_attack(&offense, &defense, &mut self.roller);
        level
            .entities
            .set_health(target, Health { current: result.defender_hp_after, ..defense.health })?;
        self.stats.damage_taken += (defense.health.current - result.defender_hp_after) as u64;
        events.push((
            MessageCategory::Combat,
            describe_attack(&actor_name(kind), &actor_name(EntityKind::Player), &result),
        ));
        Ok(())
    }

    /// Recompute the player's view and fold it into the level's memory
    fn refresh_visibility(&mut self) -> GameResult<()> {
        let radius = self.world.config().fov_radius;
        let player = self.world.player();
        let level = self.world.current_level_mut()?;
        let origin = level.entities.position(player)?;
        self.visible = compute_visible(&level.map, &mut level.visited, origin, radius);
        Ok(())
    }

    /// Fog-of-war view of the current level. Unknown tiles carry no tile
    /// kind; only actors on visible tiles are listed.
    pub fn render_snapshot(&self) -> GameResult<RenderSnapshot> {
        let level = self.world.current_level()?;
        let map = &level.map;

        let tiles = (0..map.height)
            .flat_map(|y| (0..map.width).map(move |x| Position::new(x, y)))
            .map(|pos| {
                let visibility = classify(&self.visible, &level.visited, pos);
                TileView {
                    tile: if visibility.is_known() { map.tile_at(pos) } else { None },
                    visibility,
                }
            })
            .collect();

        let entities = level
            .entities
            .actors()
            .into_iter()
            .filter(|actor| self.visible.contains(&actor.position))
            .map(|actor| EntityView {
                kind: actor.kind,
                position: actor.position,
                visibility: VisibilityClass::Visible,
                hp: actor.health.current,
                max_hp: actor.health.max,
            })
            .collect();

        let player = self.world.player();
        let health = level.entities.health(player)?;
        Ok(RenderSnapshot {
            width: map.width,
            height: map.height,
            tiles,
            entities,
            player: PlayerView {
                hp: health.current,
                max_hp: health.max,
                depth: self.depth(),
                turn: self.turn(),
                xp: level.entities.experience(player)?.xp,
                position: level.entities.position(player)?,
            },
            game_over: self.is_game_over(),
        })
    }

    /// Explored tiles of `depth`, regardless of what is in sight now.
    /// Never-explored tiles stay hidden.
    pub fn full_level_map(&self, depth: u32) -> GameResult<LevelMap> {
        let level = self.world.level(depth)?;
        let map = &level.map;
        let tiles = (0..map.area())
            .map(|idx| {
                let (x, y) = map.idx_to_xy(idx);
                let pos = Position::new(x, y);
                level.visited.is_visited(pos).then(|| map.tiles[idx])
            })
            .collect();

        Ok(LevelMap {
            depth,
            width: map.width,
            height: map.height,
            tiles,
        })
    }
}

/// Name as used in narration
fn actor_name(kind: EntityKind) -> String {
    match kind {
        EntityKind::Player => kind.name().to_string(),
        _ => format!("the {}", kind.name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DamageDice, FixedRolls};
    use crate::ecs::{Direction, StatBlock};
    use crate::world::Map;

    fn small_config() -> GameConfig {
        GameConfig {
            map_width: 40,
            map_height: 30,
            ..GameConfig::default()
        }
    }

    /// A run whose depth 1 is replaced by a hand-built room with no enemies.
    /// The player stands at (2, 2).
    fn staged_game<R: DiceRoller>(rows: &[&str], roller: R) -> Game<R> {
        let mut game = Game::with_roller(1, small_config(), roller).unwrap();
        let player = game.player();
        let level = game.world_mut().current_level_mut().unwrap();
        for enemy in level.entities.enemies_in_spawn_order() {
            level.entities.remove(enemy).unwrap();
        }
        level.map = Map::from_rows(rows);
        level.visited = crate::world::VisitedMask::for_map(&level.map);
        level.entities.teleport(player, &level.map, Position::new(2, 2)).unwrap();
        game.refresh_visibility().unwrap();
        game
    }

    fn open_rows() -> Vec<&'static str> {
        vec![
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ]
    }

    fn add_goblin<R: DiceRoller>(game: &mut Game<R>, pos: Position, stats: StatBlock) -> EntityId {
        let level = game.world_mut().current_level_mut().unwrap();
        level
            .entities
            .spawn_enemy(&level.map, EntityKind::Goblin, pos, stats, 5)
            .unwrap()
    }

    fn goblin_stats() -> StatBlock {
        StatBlock::new(7, 12, 4, DamageDice::new(1, 6, 0))
    }

    #[test]
    fn test_move_into_wall_rejected_without_turn() {
        let mut game = staged_game(&open_rows(), FixedRolls::new(vec![10]));
        let result = game.apply_intent(Intent::Move(Direction::North)).unwrap();
        assert!(result.accepted);
        assert_eq!(game.turn(), 1);

        let result = game.apply_intent(Intent::Move(Direction::North)).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.events, vec!["You can't go that way.".to_string()]);
        assert_eq!(game.turn(), 1, "rejections never advance the turn");
        assert_eq!(game.player_position().unwrap(), Position::new(2, 1));
        assert_eq!(game.phase(), TurnPhase::AwaitingInput);
    }

    #[test]
    fn test_stairs_off_stairs_rejected() {
        let mut game = staged_game(&open_rows(), FixedRolls::new(vec![10]));
        let result = game.apply_intent(Intent::UseStairs).unwrap();
        assert!(!result.accepted);
        assert_eq!(game.turn(), 0);
        assert_eq!(game.depth(), 1);
    }

    #[test]
    fn test_goblin_attack_scenario() {
        // Goblin rolls 15 to hit, then 4 damage
        let mut game = staged_game(&open_rows(), FixedRolls::new(vec![15, 4]));
        add_goblin(&mut game, Position::new(3, 3), goblin_stats());
        let player = game.player();
        {
            let level = game.world_mut().current_level_mut().unwrap();
            level.entities.set_health(player, Health { current: 10, max: 10 }).unwrap();
        }

        let result = game.apply_intent(Intent::Wait).unwrap();
        assert!(result.accepted);
        assert_eq!(game.player_health().unwrap().current, 6);
        assert!(result.events.iter().any(|e| e == "The goblin hits you for 4 damage."));
        assert_eq!(game.stats().damage_taken, 4);
    }

    #[test]
    fn test_killed_enemy_never_acts() {
        // Player: 19 to hit, 8 damage kills the 7 hp goblin. Any later roll
        // would come from a goblin attack.
        let mut game = staged_game(&open_rows(), FixedRolls::new(vec![19, 8]));
        let goblin = add_goblin(&mut game, Position::new(3, 2), goblin_stats());

        let result = game.apply_intent(Intent::Move(Direction::East)).unwrap();
        assert!(result.accepted);
        let level = game.world().current_level().unwrap();
        assert!(!level.entities.contains(goblin));
        assert_eq!(game.player_health().unwrap().current, small_config().player.hp);
        assert_eq!(game.stats().enemies_slain, 1);
        assert_eq!(level.entities.experience(game.player()).unwrap().xp, 5);
        assert_eq!(game.player_position().unwrap(), Position::new(2, 2));
    }

    #[test]
    fn test_all_enemies_act_after_player_dies() {
        // Each goblin: 20 to hit, 6 damage
        let mut game = staged_game(&open_rows(), FixedRolls::new(vec![20, 6]));
        let first = add_goblin(&mut game, Position::new(3, 3), goblin_stats());
        let second = add_goblin(&mut game, Position::new(1, 1), goblin_stats());
        let player = game.player();
        {
            let level = game.world_mut().current_level_mut().unwrap();
            level.entities.set_health(player, Health { current: 5, max: 24 }).unwrap();
        }

        let result = game.apply_intent(Intent::Wait).unwrap();
        assert!(result.game_over);
        let attacks = result.events.iter().filter(|e| e.starts_with("The goblin hits you")).count();
        assert_eq!(attacks, 2, "both goblins finish the round");
        assert_eq!(game.phase(), TurnPhase::GameOver);
        assert_eq!(game.player_health().unwrap().current, 0);

        let level = game.world().current_level().unwrap();
        assert!(level.entities.contains(first) && level.entities.contains(second));

        let after = game.apply_intent(Intent::Wait).unwrap();
        assert!(!after.accepted);
        assert!(after.game_over);
        assert_eq!(game.turn(), 1);
    }

    #[test]
    fn test_snapshot_hides_unknown_and_remembers() {
        let rows = [
            "####################",
            "#........#.........#",
            "#........#.........#",
            "#........#.........#",
            "####################",
        ];
        let mut game = staged_game(&rows, FixedRolls::new(vec![10]));
        let snapshot = game.render_snapshot().unwrap();
        let behind = snapshot.tile(12, 2).unwrap();
        assert_eq!(behind.visibility, VisibilityClass::Unknown);
        assert_eq!(behind.tile, None);
        assert_eq!(snapshot.tile(9, 2).unwrap().tile, Some(TileType::Wall));
        assert_eq!(snapshot.player.position, Position::new(2, 2));

        // Step away; the start tile is remembered, not forgotten
        for _ in 0..6 {
            game.apply_intent(Intent::Move(Direction::East)).unwrap();
        }
        let level = game.world_mut().current_level_mut().unwrap();
        level.map.set_tile(9, 2, TileType::Floor);
        game.refresh_visibility().unwrap();
        for _ in 0..4 {
            game.apply_intent(Intent::Move(Direction::East)).unwrap();
        }
        let snapshot = game.render_snapshot().unwrap();
        assert_eq!(snapshot.tile(1, 1).unwrap().visibility, VisibilityClass::Remembered);
        assert_eq!(snapshot.tile(1, 1).unwrap().tile, Some(TileType::Floor));
    }

    #[test]
    fn test_snapshot_lists_only_visible_entities() {
        let rows = [
            "####################",
            "#........#.........#",
            "#........#.........#",
            "#........#.........#",
            "####################",
        ];
        let mut game = staged_game(&rows, FixedRolls::new(vec![1]));
        add_goblin(&mut game, Position::new(15, 2), goblin_stats());
        game.refresh_visibility().unwrap();

        let snapshot = game.render_snapshot().unwrap();
        let kinds: Vec<_> = snapshot.entities.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Player]);
    }

    #[test]
    fn test_full_level_map_only_explored() {
        let game = Game::new(3, small_config()).unwrap();
        let map = game.full_level_map(1).unwrap();
        let level = game.world().current_level().unwrap();
        assert_eq!(map.known_count(), level.visited.count());
        assert!(map.known_count() > 0);
        assert!(matches!(game.full_level_map(9), Err(GameError::LevelNotFound(9))));
    }

    #[test]
    fn test_descend_and_return_through_scheduler() {
        let mut game = Game::new(21, small_config()).unwrap();
        let player = game.player();
        let stairs = {
            let level = game.world_mut().current_level_mut().unwrap();
            for enemy in level.entities.enemies_in_spawn_order() {
                level.entities.remove(enemy).unwrap();
            }
            let stairs = level.stairs_down;
            level.entities.teleport(player, &level.map, stairs).unwrap();
            stairs
        };

        let down = game.apply_intent(Intent::UseStairs).unwrap();
        assert!(down.accepted);
        assert_eq!(down.events[0], "You descend to depth 2.");
        assert_eq!(game.depth(), 2);
        assert_eq!(game.stats().deepest_depth, 2);

        // A fresh level spawns nothing near its entry, so arrival is the way up
        let here = game.player_position().unwrap();
        {
            let level = game.world_mut().current_level_mut().unwrap();
            assert_eq!(Some(here), level.stairs_up);
            assert_eq!(level.map.tile_at(here), Some(TileType::StairsUp));
            for enemy in level.entities.enemies_in_spawn_order() {
                level.entities.remove(enemy).unwrap();
            }
        }

        let up = game.apply_intent(Intent::UseStairs).unwrap();
        assert!(up.accepted);
        assert_eq!(up.events[0], "You climb back up to depth 1.");
        assert_eq!(game.depth(), 1);
        assert_eq!(game.player_position().unwrap(), stairs);

        let again = game.apply_intent(Intent::UseStairs).unwrap();
        assert_eq!(again.events[0], "You return to depth 2.");
        assert_eq!(game.player_position().unwrap(), here);
    }

    #[test]
    fn test_same_seed_same_run() {
        let script = [
            Intent::Move(Direction::East),
            Intent::Wait,
            Intent::Move(Direction::South),
            Intent::Move(Direction::West),
            Intent::Wait,
        ];
        let play = || {
            let mut game = Game::new(77, small_config()).unwrap();
            let mut log = Vec::new();
            for intent in script {
                log.push(game.apply_intent(intent).unwrap());
            }
            (log, game.render_snapshot().unwrap())
        };
        assert_eq!(play(), play());
    }
}

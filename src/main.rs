//! Delve - Entry Point
//!
//! Headless demo driver: starts a seeded run and autoplays it, walking
//! toward the stairs over explored ground and fighting whatever gets in
//! the way. Prints the final view as ASCII or JSON.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use delve::data::{export_default_config, GameConfig};
use delve::ecs::{Direction, Position};
use delve::game::{Game, Intent};
use delve::world::{LevelState, TileType};

#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Autoplay a seeded run through the caves")]
#[command(version)]
struct Args {
    /// Root seed for the run
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Rounds to play before stopping
    #[arg(short, long, default_value_t = 200)]
    turns: u32,

    /// Print the final snapshot as JSON instead of ASCII
    #[arg(long)]
    json: bool,

    /// Write logs here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Load this config file instead of searching the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the default config to this path and exit
    #[arg(long)]
    export_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    if let Some(path) = &args.export_config {
        export_default_config(path)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => GameConfig::load_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::load(),
    };

    log::info!("Starting Delve v{} with seed {}", env!("CARGO_PKG_VERSION"), args.seed);
    let mut game = Game::new(args.seed, config).context("starting run")?;

    for _ in 0..args.turns {
        if game.is_game_over() {
            break;
        }
        let intent = choose_intent(&game)?;
        let result = game.apply_intent(intent)?;
        if !result.accepted {
            // Autoplay should never pick an illegal move, but don't spin on one
            log::warn!("Autoplay intent {:?} rejected: {:?}", intent, result.events);
            game.apply_intent(Intent::Wait)?;
        }
    }

    let snapshot = game.render_snapshot()?;
    if args.json {
        let report = serde_json::json!({
            "seed": args.seed,
            "stats": game.stats(),
            "snapshot": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", snapshot.to_ascii());
        println!();
        let stats = game.stats();
        println!(
            "Depth {} | Turn {} | HP {}/{} | XP {}",
            snapshot.player.depth,
            snapshot.player.turn,
            snapshot.player.hp,
            snapshot.player.max_hp,
            snapshot.player.xp
        );
        println!(
            "Slain {} | Deepest {} | Dealt {} | Taken {} | Steps {}",
            stats.enemies_slain,
            stats.deepest_depth,
            stats.damage_dealt,
            stats.damage_taken,
            stats.steps_taken
        );
        println!();
        let messages: Vec<_> = game.messages().collect();
        for message in messages.iter().skip(messages.len().saturating_sub(10)) {
            println!("[{:>4}] {}", message.turn, message.text);
        }
    }

    log::info!("Delve shut down cleanly");
    Ok(())
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

/// Pick the next move: descend when on the stairs, fight adjacent
/// enemies, otherwise walk toward the stairs (or unexplored ground).
fn choose_intent(game: &Game) -> Result<Intent> {
    let level = game.world().current_level()?;
    let here = game.player_position()?;

    if level.map.tile_at(here) == Some(TileType::StairsDown) {
        return Ok(Intent::UseStairs);
    }

    let adjacent_enemy = level
        .entities
        .actors()
        .into_iter()
        .filter(|a| a.kind.is_hostile() && a.position.chebyshev_distance(&here) == 1)
        .min_by_key(|a| a.health.current);
    if let Some(enemy) = adjacent_enemy {
        let step = Direction::from_delta(enemy.position.x - here.x, enemy.position.y - here.y);
        if let Some(direction) = step {
            return Ok(Intent::Move(direction));
        }
    }

    Ok(first_step(level, here).map_or(Intent::Wait, Intent::Move))
}

/// BFS over explored walkable tiles toward the stairs if they have been
/// seen, otherwise toward the nearest explored tile bordering the unknown.
fn first_step(level: &LevelState, start: Position) -> Option<Direction> {
    let map = &level.map;
    let stairs_known = level.visited.is_visited(level.stairs_down);
    let is_goal = |pos: Position| {
        if stairs_known {
            pos == level.stairs_down
        } else {
            Direction::ALL.iter().any(|d| {
                let (dx, dy) = d.delta();
                let next = pos.offset(dx, dy);
                map.contains(next) && !level.visited.is_visited(next)
            })
        }
    };

    let mut came_from = vec![None; map.area()];
    let mut queue = VecDeque::from([start]);
    came_from[map.xy_to_idx(start.x, start.y)] = Some(start);

    while let Some(pos) = queue.pop_front() {
        if pos != start && is_goal(pos) {
            // Walk back to the step taken from the start
            let mut step = pos;
            while let Some(prev) = came_from[map.xy_to_idx(step.x, step.y)] {
                if prev == start {
                    return Direction::from_delta(step.x - start.x, step.y - start.y);
                }
                step = prev;
            }
            return None;
        }
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let next = pos.offset(dx, dy);
            if !map.is_walkable(next.x, next.y) || !level.visited.is_visited(next) {
                continue;
            }
            let idx = map.xy_to_idx(next.x, next.y);
            if came_from[idx].is_some() || level.entities.occupant_at(next).is_some() {
                continue;
            }
            came_from[idx] = Some(pos);
            queue.push_back(next);
        }
    }
    None
}

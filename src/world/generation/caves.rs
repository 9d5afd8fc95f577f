//! Cave generator using cellular automata
//!
//! Creates organic, natural-looking cave systems with a guaranteed walkable
//! path from the spawn point to the stairs down.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{attempt_seed, fallback_room, level_seed, GeneratedCave};
use crate::ecs::Position;
use crate::world::{Map, TileType};

/// Tunables for the cellular automaton
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveParams {
    /// Chance each cell starts as wall
    pub wall_probability: f64,
    /// Smoothing passes
    pub generations: u32,
    /// A floor cell turns to wall with at least this many wall neighbours
    pub birth_threshold: u8,
    /// A wall cell stays wall with at least this many wall neighbours
    pub survival_threshold: u8,
    /// Smallest acceptable share of the map taken by the kept region
    pub min_floor_fraction: f64,
    /// Attempts before falling back to a plain room
    pub max_attempts: u32,
}

impl CaveParams {
    /// One threshold for both rules: wall iff wall neighbours >= `threshold`
    pub fn single_threshold(wall_probability: f64, generations: u32, threshold: u8) -> Self {
        Self {
            wall_probability,
            generations,
            birth_threshold: threshold,
            survival_threshold: threshold,
            ..Self::default()
        }
    }
}

impl Default for CaveParams {
    fn default() -> Self {
        Self {
            wall_probability: 0.45,
            generations: 5,
            birth_threshold: 5,
            survival_threshold: 4,
            min_floor_fraction: 0.30,
            max_attempts: 8,
        }
    }
}

/// Generate a cave level. Deterministic for `(width, height, depth, seed)`.
///
/// Never fails: after `max_attempts` rejected caves a plain room is returned.
pub fn generate_caves(
    width: i32,
    height: i32,
    depth: u32,
    seed: u64,
    params: &CaveParams,
) -> GeneratedCave {
    let base_seed = level_seed(seed, depth);
    let min_floor = ((width.max(0) * height.max(0)) as f64 * params.min_floor_fraction).ceil() as usize;
    // spawn and stairs need distinct tiles
    let min_floor = min_floor.max(2);

    for attempt in 0..params.max_attempts {
        let mut rng = StdRng::seed_from_u64(attempt_seed(base_seed, attempt));
        let mut map = Map::new(width, height);

        // Initial random fill
        seed_noise(&mut map, &mut rng, params.wall_probability);

        // Run cellular automata iterations
        for _ in 0..params.generations {
            smooth(&mut map, params);
        }

        // Keep the largest region
        let kept = keep_largest_region(&mut map);
        if kept < min_floor {
            log::debug!(
                "Depth {} attempt {}: largest region {} < {} tiles, retrying",
                depth,
                attempt,
                kept,
                min_floor
            );
            continue;
        }

        let Some(spawn) = centroid_floor(&map) else {
            continue;
        };
        let Some(stairs_down) = farthest_floor(&map, spawn) else {
            continue;
        };
        if stairs_down == spawn {
            continue;
        }

        log::debug!(
            "Depth {} generated on attempt {} ({} floor tiles)",
            depth,
            attempt,
            kept
        );
        return GeneratedCave {
            map,
            spawn,
            stairs_down,
            attempts: attempt + 1,
            used_fallback: false,
        };
    }

    log::warn!(
        "Cave generation for depth {} failed after {} attempts, using fallback room",
        depth,
        params.max_attempts
    );
    let mut cave = fallback_room(width, height);
    cave.attempts = params.max_attempts;
    cave
}

/// Fill the interior with noise; the border ring stays wall
fn seed_noise(map: &mut Map, rng: &mut StdRng, wall_probability: f64) {
    let p = wall_probability.clamp(0.0, 1.0);
    for y in 1..map.height - 1 {
        for x in 1..map.width - 1 {
            if !rng.gen_bool(p) {
                map.set_tile(x, y, TileType::Floor);
            }
        }
    }
}

/// One cellular automata pass. Out-of-bounds neighbours count as wall.
fn smooth(map: &mut Map, params: &CaveParams) {
    let mut new_tiles = map.tiles.clone();

    for y in 0..map.height {
        for x in 0..map.width {
            let idx = map.xy_to_idx(x, y);
            if is_border(map, x, y) {
                new_tiles[idx] = TileType::Wall;
                continue;
            }

            let wall_count = map.wall_neighbors(x, y);
            let threshold = if map.tiles[idx] == TileType::Wall {
                params.survival_threshold
            } else {
                params.birth_threshold
            };

            new_tiles[idx] = if wall_count >= threshold {
                TileType::Wall
            } else {
                TileType::Floor
            };
        }
    }

    map.tiles = new_tiles;
}

fn is_border(map: &Map, x: i32, y: i32) -> bool {
    x == 0 || y == 0 || x == map.width - 1 || y == map.height - 1
}

/// Wall over every region but the largest. Returns the kept size.
fn keep_largest_region(map: &mut Map) -> usize {
    let mut regions = map.walkable_regions();
    if regions.is_empty() {
        return 0;
    }

    // Stable sort: on equal sizes the first-discovered region wins
    regions.sort_by(|a, b| b.len().cmp(&a.len()));

    for region in regions.iter().skip(1) {
        for pos in region {
            map.set_tile(pos.x, pos.y, TileType::Wall);
        }
    }

    regions[0].len()
}

/// The floor tile nearest the centroid of all floor tiles.
/// Ties go to the lowest row-major coordinate.
fn centroid_floor(map: &Map) -> Option<Position> {
    let floors = map.walkable_positions();
    if floors.is_empty() {
        return None;
    }

    let n = floors.len() as f64;
    let cx = floors.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let cy = floors.iter().map(|p| p.y as f64).sum::<f64>() / n;

    // walkable_positions is row-major, so the first minimum is the tie winner
    let mut best: Option<(f64, Position)> = None;
    for pos in floors {
        let d = (pos.x as f64 - cx).powi(2) + (pos.y as f64 - cy).powi(2);
        match best {
            Some((best_d, _)) if d >= best_d => {}
            _ => best = Some((d, pos)),
        }
    }
    best.map(|(_, pos)| pos)
}

/// The reachable floor tile with the greatest BFS distance from `from`.
/// Ties go to the lowest row-major coordinate.
fn farthest_floor(map: &Map, from: Position) -> Option<Position> {
    let dist = map.distances_from(from);
    let mut best: Option<(u32, Position)> = None;

    for (idx, d) in dist.iter().enumerate() {
        let Some(d) = *d else { continue };
        let (x, y) = map.idx_to_xy(idx);
        match best {
            Some((best_d, _)) if d <= best_d => {}
            _ => best = Some((d, Position::new(x, y))),
        }
    }

    best.map(|(_, pos)| pos)
}

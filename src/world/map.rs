//! Map data structure
//!
//! The fixed-size 2D tile grid of one cave level, plus the graph
//! searches generation and placement run over it.

use std::collections::VecDeque;

use super::tile::TileType;
use crate::ecs::Position;

/// Orthogonal neighbour offsets used for region and distance searches
const CARDINALS: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// All eight neighbour offsets
const NEIGHBORS: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// A cave level's tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<TileType>,
}

impl Map {
    /// Create a new map filled with walls
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            tiles: vec![TileType::Wall; (width * height) as usize],
        }
    }

    /// A single open room: walkable interior inside a one-tile wall ring
    pub fn open_room(width: i32, height: i32) -> Self {
        let mut map = Map::new(width, height);
        for y in 1..map.height - 1 {
            for x in 1..map.width - 1 {
                map.set_tile(x, y, TileType::Floor);
            }
        }
        map
    }

    /// Build a map from rows of glyphs (`#` wall, `.` floor, `>`/`<` stairs).
    /// Short rows are padded with wall.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut map = Map::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = match ch {
                    '.' => TileType::Floor,
                    '>' => TileType::StairsDown,
                    '<' => TileType::StairsUp,
                    _ => TileType::Wall,
                };
                map.set_tile(x as i32, y as i32, tile);
            }
        }
        map
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.in_bounds(pos.x, pos.y)
    }

    pub fn area(&self) -> usize {
        self.tiles.len()
    }

    /// Get tile at position
    pub fn get_tile(&self, x: i32, y: i32) -> Option<TileType> {
        if self.in_bounds(x, y) {
            Some(self.tiles[self.xy_to_idx(x, y)])
        } else {
            None
        }
    }

    pub fn tile_at(&self, pos: Position) -> Option<TileType> {
        self.get_tile(pos.x, pos.y)
    }

    /// Set tile type at position
    pub fn set_tile(&mut self, x: i32, y: i32, tile_type: TileType) {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x, y);
            self.tiles[idx] = tile_type;
        }
    }

    /// Check if a position is walkable
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(false, |t| t.is_walkable())
    }

    /// Check if a position blocks line of sight. Out of bounds is opaque.
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(true, |t| !t.is_transparent())
    }

    /// Number of walkable tiles
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_walkable()).count()
    }

    /// Count wall neighbours (8-directional); out of bounds counts as wall
    pub fn wall_neighbors(&self, x: i32, y: i32) -> u8 {
        NEIGHBORS
            .iter()
            .filter(|(dx, dy)| !self.is_walkable(x + dx, y + dy))
            .count() as u8
    }

    /// Get all walkable positions in row-major order
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_walkable())
            .map(|(idx, _)| {
                let (x, y) = self.idx_to_xy(idx);
                Position::new(x, y)
            })
            .collect()
    }

    /// Orthogonally connected regions of walkable tiles, in discovery order
    pub fn walkable_regions(&self) -> Vec<Vec<Position>> {
        let mut visited = vec![false; self.area()];
        let mut regions = Vec::new();

        for idx in 0..self.area() {
            if visited[idx] || !self.tiles[idx].is_walkable() {
                continue;
            }
            let (x, y) = self.idx_to_xy(idx);
            let mut region = Vec::new();
            let mut queue = VecDeque::from([Position::new(x, y)]);
            visited[idx] = true;

            while let Some(pos) = queue.pop_front() {
                region.push(pos);
                for (dx, dy) in CARDINALS {
                    let (nx, ny) = (pos.x + dx, pos.y + dy);
                    if self.is_walkable(nx, ny) {
                        let nidx = self.xy_to_idx(nx, ny);
                        if !visited[nidx] {
                            visited[nidx] = true;
                            queue.push_back(Position::new(nx, ny));
                        }
                    }
                }
            }
            regions.push(region);
        }

        regions
    }

    /// Breadth-first step distances over orthogonally connected walkable
    /// tiles. `None` marks unreachable tiles.
    pub fn distances_from(&self, start: Position) -> Vec<Option<u32>> {
        let mut dist = vec![None; self.area()];
        if !self.is_walkable(start.x, start.y) {
            return dist;
        }

        let start_idx = self.xy_to_idx(start.x, start.y);
        dist[start_idx] = Some(0);
        let mut queue = VecDeque::from([start]);

        while let Some(pos) = queue.pop_front() {
            let d = dist[self.xy_to_idx(pos.x, pos.y)].unwrap_or(0);
            for (dx, dy) in CARDINALS {
                let (nx, ny) = (pos.x + dx, pos.y + dy);
                if self.is_walkable(nx, ny) {
                    let nidx = self.xy_to_idx(nx, ny);
                    if dist[nidx].is_none() {
                        dist[nidx] = Some(d + 1);
                        queue.push_back(Position::new(nx, ny));
                    }
                }
            }
        }

        dist
    }

    /// Whether `to` can be reached from `from` over walkable tiles
    pub fn is_reachable(&self, from: Position, to: Position) -> bool {
        if !self.contains(to) {
            return false;
        }
        self.distances_from(from)[self.xy_to_idx(to.x, to.y)].is_some()
    }

    /// Nearest walkable tile (8-way BFS from `origin`, origin included)
    /// satisfying `accept`.
    pub fn nearest_walkable(
        &self,
        origin: Position,
        mut accept: impl FnMut(Position) -> bool,
    ) -> Option<Position> {
        if !self.contains(origin) {
            return None;
        }
        let mut visited = vec![false; self.area()];
        visited[self.xy_to_idx(origin.x, origin.y)] = true;
        let mut queue = VecDeque::from([origin]);

        while let Some(pos) = queue.pop_front() {
            if self.is_walkable(pos.x, pos.y) && accept(pos) {
                return Some(pos);
            }
            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (pos.x + dx, pos.y + dy);
                if self.is_walkable(nx, ny) {
                    let nidx = self.xy_to_idx(nx, ny);
                    if !visited[nidx] {
                        visited[nidx] = true;
                        queue.push_back(Position::new(nx, ny));
                    }
                }
            }
        }
        None
    }

    /// Rows of glyphs, for logs and debugging
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.tiles[self.xy_to_idx(x, y)].glyph())
                    .collect()
            })
            .collect()
    }
}

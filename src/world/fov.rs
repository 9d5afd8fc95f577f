//! Field of View calculation
//!
//! Uses recursive shadowcasting over eight octants. Walls are lit so
//! they can be seen, but they stop sight from passing beyond them.

use std::collections::HashSet;

use super::map::Map;
use super::tile::VisibilityClass;
use crate::ecs::Position;

/// Tiles in sight this turn
pub type VisibleSet = HashSet<Position>;

/// Octant multipliers: `(xx, xy, yx, yy)` mapping `(col, row)` onto the grid
const OCTANTS: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, 1, -1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, -1, 1, 0),
    (1, 0, 0, -1),
];

/// Permanent exploration memory for one level. Bits are only ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedMask {
    width: i32,
    height: i32,
    bits: Vec<bool>,
}

impl VisitedMask {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width.max(0) * height.max(0)) as usize],
        }
    }

    pub fn for_map(map: &Map) -> Self {
        Self::new(map.width, map.height)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Mark a tile as explored
    pub fn mark(&mut self, pos: Position) {
        if let Some(idx) = self.index(pos) {
            self.bits[idx] = true;
        }
    }

    pub fn is_visited(&self, pos: Position) -> bool {
        self.index(pos).map_or(false, |idx| self.bits[idx])
    }

    /// Number of explored tiles
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// True if every bit set in `earlier` is still set here
    pub fn includes(&self, earlier: &VisitedMask) -> bool {
        self.bits.len() == earlier.bits.len()
            && earlier.bits.iter().zip(&self.bits).all(|(was, now)| !*was || *now)
    }
}

/// Compute the set of tiles visible from `origin` within a Euclidean `radius`.
///
/// Pure; used both for the player and for enemies checking whether the
/// player is in sight.
pub fn field_of_view(map: &Map, origin: Position, radius: i32) -> VisibleSet {
    let mut visible = VisibleSet::new();
    if !map.contains(origin) {
        return visible;
    }

    // Origin is always visible
    visible.insert(origin);

    for octant in OCTANTS {
        cast_light(map, &mut visible, origin, radius, 1, 1.0, 0.0, octant);
    }

    visible
}

/// Compute the player's view and fold it into the level's explored memory.
pub fn compute_visible(
    map: &Map,
    visited: &mut VisitedMask,
    origin: Position,
    radius: i32,
) -> VisibleSet {
    let visible = field_of_view(map, origin, radius);
    for pos in &visible {
        visited.mark(*pos);
    }
    visible
}

/// Rendering-facing class of a single tile
pub fn classify(visible: &VisibleSet, visited: &VisitedMask, pos: Position) -> VisibilityClass {
    VisibilityClass::from_flags(visible.contains(&pos), visited.is_visited(pos))
}

/// Recursive shadowcasting for a single octant
#[allow(clippy::too_many_arguments)]
fn cast_light(
    map: &Map,
    visible: &mut VisibleSet,
    origin: Position,
    radius: i32,
    row: i32,
    mut start_slope: f64,
    end_slope: f64,
    (xx, xy, yx, yy): (i32, i32, i32, i32),
) {
    if start_slope < end_slope {
        return;
    }

    let radius_squared = radius * radius;
    let mut next_start_slope = start_slope;

    for j in row..=radius {
        let mut blocked = false;
        let dy = -j;

        for dx in -j..=0 {
            let cur_x = origin.x + dx * xx + dy * xy;
            let cur_y = origin.y + dx * yx + dy * yy;

            let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
            let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

            if start_slope < right_slope {
                continue;
            }
            if end_slope > left_slope {
                break;
            }

            // Check if within circular radius
            if dx * dx + dy * dy <= radius_squared && map.in_bounds(cur_x, cur_y) {
                visible.insert(Position::new(cur_x, cur_y));
            }

            let opaque = map.is_opaque(cur_x, cur_y);
            if blocked {
                if opaque {
                    next_start_slope = right_slope;
                } else {
                    blocked = false;
                    start_slope = next_start_slope;
                }
            } else if opaque && j < radius {
                blocked = true;
                cast_light(
                    map,
                    visible,
                    origin,
                    radius,
                    j + 1,
                    start_slope,
                    left_slope,
                    (xx, xy, yx, yy),
                );
                next_start_slope = right_slope;
            }
        }

        if blocked {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_pillar() -> Map {
        let mut map = Map::open_room(15, 11);
        map.set_tile(7, 5, crate::world::TileType::Wall);
        map
    }

    #[test]
    fn test_open_room_sees_everything_in_radius() {
        let map = Map::open_room(9, 9);
        let visible = field_of_view(&map, Position::new(4, 4), 8);
        // Every tile of a convex room, walls included
        assert_eq!(visible.len(), 81);
    }

    #[test]
    fn test_radius_limits_sight() {
        let map = Map::open_room(30, 30);
        let origin = Position::new(15, 15);
        let visible = field_of_view(&map, origin, 3);
        assert!(visible.contains(&Position::new(18, 15)));
        assert!(!visible.contains(&Position::new(19, 15)));
        assert!(!visible.contains(&Position::new(18, 18)));
    }

    #[test]
    fn test_wall_is_visible_but_blocks_tile_behind_it() {
        let map = room_with_pillar();
        let visible = field_of_view(&map, Position::new(5, 5), 8);
        assert!(visible.contains(&Position::new(7, 5)), "wall itself is seen");
        assert!(!visible.contains(&Position::new(8, 5)), "floor behind the wall is hidden");
        assert!(visible.contains(&Position::new(8, 3)), "off-axis floor stays visible");
    }

    #[test]
    fn test_hidden_tile_is_remembered_once_explored() {
        let map = room_with_pillar();
        let mut visited = VisitedMask::for_map(&map);
        let behind = Position::new(8, 5);

        // Never seen yet
        let visible = compute_visible(&map, &mut visited, Position::new(5, 5), 8);
        assert_eq!(classify(&visible, &visited, behind), VisibilityClass::Unknown);

        // Walk around the pillar, then step back
        let visible = compute_visible(&map, &mut visited, Position::new(9, 5), 8);
        assert_eq!(classify(&visible, &visited, behind), VisibilityClass::Visible);

        let visible = compute_visible(&map, &mut visited, Position::new(5, 5), 8);
        assert_eq!(classify(&visible, &visited, behind), VisibilityClass::Remembered);
    }

    #[test]
    fn test_visited_mask_is_monotone() {
        let map = Map::open_room(40, 20);
        let mut visited = VisitedMask::for_map(&map);
        let mut previous = visited.clone();
        for x in [3, 10, 20, 35, 5] {
            compute_visible(&map, &mut visited, Position::new(x, 10), 6);
            assert!(visited.includes(&previous));
            assert!(visited.count() >= previous.count());
            previous = visited.clone();
        }
    }

    #[test]
    fn test_origin_outside_map_sees_nothing() {
        let map = Map::open_room(5, 5);
        assert!(field_of_view(&map, Position::new(-3, 2), 4).is_empty());
    }
}

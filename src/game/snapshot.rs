//! Read-only views for renderers
//!
//! Built fresh on request; holding one never affects the game.

use serde::Serialize;

use crate::ecs::{EntityKind, Position};
use crate::world::{TileType, VisibilityClass};

/// One cell as a renderer may show it. Unknown cells carry no tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub tile: Option<TileType>,
    pub visibility: VisibilityClass,
}

/// An actor the player can currently see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub position: Position,
    pub visibility: VisibilityClass,
    pub hp: i32,
    pub max_hp: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub hp: i32,
    pub max_hp: i32,
    pub depth: u32,
    pub turn: u64,
    pub xp: u32,
    pub position: Position,
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSnapshot {
    pub width: i32,
    pub height: i32,
    /// Row-major
    pub tiles: Vec<TileView>,
    pub entities: Vec<EntityView>,
    pub player: PlayerView,
    pub game_over: bool,
}

impl RenderSnapshot {
    pub fn tile(&self, x: i32, y: i32) -> Option<&TileView> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize)
    }

    /// Plain glyph rendering: unknown cells are blank, actors drawn over
    /// their tiles
    pub fn to_ascii(&self) -> String {
        let mut rows: Vec<Vec<char>> = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| match self.tile(x, y).and_then(|t| t.tile) {
                        Some(tile) => tile.glyph(),
                        None => ' ',
                    })
                    .collect()
            })
            .collect();

        for entity in &self.entities {
            if let Some(cell) = rows
                .get_mut(entity.position.y as usize)
                .and_then(|row| row.get_mut(entity.position.x as usize))
            {
                *cell = entity.kind.glyph();
            }
        }

        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Explored layout of one depth, for the minimap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelMap {
    pub depth: u32,
    pub width: i32,
    pub height: i32,
    /// Row-major; `None` for never-explored tiles
    pub tiles: Vec<Option<TileType>>,
}

impl LevelMap {
    pub fn tile(&self, x: i32, y: i32) -> Option<TileType> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize).copied().flatten()
    }

    pub fn known_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    pub fn to_ascii(&self) -> String {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.tile(x, y).map_or(' ', |t| t.glyph()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

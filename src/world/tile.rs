//! Tile definitions
//!
//! Tile kinds and the fog-of-war classification handed to renderers.

use serde::{Deserialize, Serialize};

/// Types of tiles in a cave level. Fixed once a level is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Wall,
    Floor,
    StairsDown,
    StairsUp,
}

impl TileType {
    pub fn is_walkable(&self) -> bool {
        matches!(self, TileType::Floor | TileType::StairsDown | TileType::StairsUp)
    }

    pub fn is_transparent(&self) -> bool {
        !matches!(self, TileType::Wall)
    }

    pub fn is_stairs(&self) -> bool {
        matches!(self, TileType::StairsDown | TileType::StairsUp)
    }

    pub fn glyph(&self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::Wall => '#',
            TileType::StairsDown => '>',
            TileType::StairsUp => '<',
        }
    }
}

/// How much of a tile the player may know right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityClass {
    /// In sight this turn: full detail
    Visible,
    /// Explored before but not in sight: drawn dimmed
    Remembered,
    /// Never explored: tile kind withheld
    Unknown,
}

impl VisibilityClass {
    pub fn from_flags(visible: bool, explored: bool) -> Self {
        if visible {
            VisibilityClass::Visible
        } else if explored {
            VisibilityClass::Remembered
        } else {
            VisibilityClass::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, VisibilityClass::Unknown)
    }
}

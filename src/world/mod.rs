//! World module
//!
//! Contains map data structures, tiles, visibility, procedural generation
//! and the per-depth level store.

pub mod map;
pub mod tile;
pub mod fov;
pub mod level;
pub mod dungeon;
pub mod generation;

pub use map::Map;
pub use tile::{TileType, VisibilityClass};
pub use fov::{classify, compute_visible, field_of_view, VisibleSet, VisitedMask};
pub use level::LevelState;
pub use dungeon::{StairDirection, Transition, WorldState};

//! Delve - a turn-based cave crawler core
//!
//! Descend through an endless stack of procedurally grown caves. Every
//! depth is generated once and kept exactly as left; what the player has
//! seen stays on the map, and every fight is settled with dice.

pub mod error;
pub mod game;
pub mod ecs;
pub mod world;
pub mod entities;
pub mod combat;
pub mod progression;
pub mod data;

// Re-export commonly used types
pub use error::{GameError, GameResult};
pub use game::{Game, Intent, RenderSnapshot, TurnResult};
pub use ecs::components::*;
pub use world::map::Map;
pub use data::GameConfig;

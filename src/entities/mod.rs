//! Entity creation and management

pub mod registry;
pub mod player;
pub mod enemies;

pub use registry::{ActorSnapshot, ActorView, EntityId, EntityRegistry, MoveOutcome, Obstacle};
pub use player::{arrival_point, spawn_player};
pub use enemies::{populate_level, spawn_candidates};

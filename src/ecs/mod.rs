//! Entity Component System module
//!
//! Defines all components and systems for the game.

pub mod components;
pub mod systems;

pub use components::*;
pub use systems::{plan_enemy_step, occupant_at, is_free, can_see, EnemyAction, StepParams};

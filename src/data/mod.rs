//! Data loading and external game content
//!
//! This module handles the game config and loading it from external RON
//! files, so balance can be tuned without a rebuild.

pub mod config;
pub mod enemies;
pub mod loader;

pub use config::{default_player_stats, GameConfig};
pub use enemies::{default_enemy_templates, eligible_templates, EnemyTemplate};
pub use loader::export_default_config;

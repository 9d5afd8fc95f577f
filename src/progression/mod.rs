//! Progression: how the dungeon hardens with depth

pub mod scaling;

pub use scaling::DepthScaling;

//! Error types shared across the engine.

use crate::ecs::Position;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// The requested action is not legal in the current state
    #[error("Invalid action: {0}")]
    InvalidIntent(String),

    /// An entity cannot be placed on this tile
    #[error("Cannot place an entity at ({}, {})", .0.x, .0.y)]
    InvalidPlacement(Position),

    /// A stale or foreign entity handle was used
    #[error("Entity {0} does not exist")]
    EntityNotFound(u64),

    /// A depth was queried before it was ever generated
    #[error("Level at depth {0} has not been generated")]
    LevelNotFound(u32),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parsing failed
    #[error("Config parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// RON serialization failed
    #[error("Config serialization error: {0}")]
    RonSer(#[from] ron::Error),
}

impl GameError {
    /// Rejections are recoverable; everything else signals a defect or
    /// an environment problem.
    pub fn is_rejection(&self) -> bool {
        matches!(self, GameError::InvalidIntent(_) | GameError::InvalidPlacement(_))
    }
}

/// Result type used throughout the Delve codebase.
pub type GameResult<T> = Result<T, GameError>;

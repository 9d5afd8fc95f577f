//! Game module - turn scheduling and the views it hands to renderers

mod messages;
mod snapshot;
mod state;
mod turn;

pub use messages::{GameMessage, MessageCategory, MessageLog, RunStats, MESSAGE_LOG_CAPACITY};
pub use snapshot::{EntityView, LevelMap, PlayerView, RenderSnapshot, TileView};
pub use state::Game;
pub use turn::{Intent, TurnPhase, TurnResult};

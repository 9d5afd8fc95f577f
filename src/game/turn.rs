//! Turn flow
//!
//! Player intents, the phases of one round, and what a round reports back.

use serde::{Deserialize, Serialize};

use crate::ecs::Direction;

/// One player command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Step, or attack whatever hostile stands there
    Move(Direction),
    /// Take the stairs underfoot, whichever way they go
    UseStairs,
    /// Spend the round in place
    Wait,
}

/// Where the scheduler is within a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingInput,
    ResolvingPlayerAction,
    EnemyPhase,
    VisibilityRefresh,
    /// Terminal: the player is dead and no more input is taken
    GameOver,
}

impl TurnPhase {
    pub fn accepts_input(&self) -> bool {
        matches!(self, TurnPhase::AwaitingInput)
    }
}

/// Report for one `apply_intent` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnResult {
    /// False when the intent was rejected and nothing changed
    pub accepted: bool,
    /// Narrated events, in the order they happened
    pub events: Vec<String>,
    pub game_over: bool,
}

impl TurnResult {
    pub fn rejected(reason: impl Into<String>, game_over: bool) -> Self {
        Self {
            accepted: false,
            events: vec![reason.into()],
            game_over,
        }
    }

    pub fn completed(events: Vec<String>, game_over: bool) -> Self {
        Self { accepted: true, events, game_over }
    }
}

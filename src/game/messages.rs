//! Message log and run statistics

use std::collections::VecDeque;

use serde::Serialize;

/// Messages kept before the oldest are dropped
pub const MESSAGE_LOG_CAPACITY: usize = 100;

/// A message to display in the game log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMessage {
    pub text: String,
    /// Turn counter when the message was written
    pub turn: u64,
    pub category: MessageCategory,
}

/// Categories for message filtering/coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageCategory {
    Combat,
    Movement,
    System,
    Warning,
}

/// Bounded log of recent messages, oldest first
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: VecDeque<GameMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, category: MessageCategory, turn: u64) {
        self.messages.push_back(GameMessage {
            text: text.into(),
            turn,
            category,
        });

        // Keep only the last 100 messages
        while self.messages.len() > MESSAGE_LOG_CAPACITY {
            self.messages.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter()
    }

    /// The newest `count` messages, oldest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter().skip(self.messages.len().saturating_sub(count))
    }
}

/// Tallies for the current run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub enemies_slain: u32,
    pub deepest_depth: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub steps_taken: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_drops_oldest() {
        let mut log = MessageLog::new();
        for i in 0..105 {
            log.push(format!("message {}", i), MessageCategory::System, i);
        }
        assert_eq!(log.len(), MESSAGE_LOG_CAPACITY);
        assert_eq!(log.iter().next().map(|m| m.text.as_str()), Some("message 5"));
        let last: Vec<_> = log.recent(2).map(|m| m.turn).collect();
        assert_eq!(last, vec![103, 104]);
    }
}

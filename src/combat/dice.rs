//! Dice
//!
//! Dice expressions and the injectable roll source used by combat.

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A damage expression such as `1d6+1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageDice {
    pub count: u32,
    pub faces: u32,
    pub modifier: i32,
}

impl DamageDice {
    pub const fn new(count: u32, faces: u32, modifier: i32) -> Self {
        Self { count, faces, modifier }
    }

    /// Roll every die, add the modifier. Never negative.
    pub fn roll(&self, roller: &mut impl DiceRoller) -> i32 {
        let dice: i64 = (0..self.count).map(|_| roller.roll_die(self.faces) as i64).sum();
        (dice + self.modifier as i64).clamp(0, i32::MAX as i64) as i32
    }
}

impl fmt::Display for DamageDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

/// Source of die rolls. Passed explicitly into every call that needs one.
pub trait DiceRoller {
    /// Roll one die with `faces` sides, returning 1..=faces (0 for a 0-sided die)
    fn roll_die(&mut self, faces: u32) -> u32;

    fn d20(&mut self) -> u32 {
        self.roll_die(20)
    }
}

impl DiceRoller for StdRng {
    fn roll_die(&mut self, faces: u32) -> u32 {
        if faces == 0 {
            return 0;
        }
        self.gen_range(1..=faces)
    }
}

/// Scripted rolls, replayed in order and cycled when exhausted.
///
/// Each scripted value is clamped to the die being rolled.
#[derive(Debug, Clone)]
pub struct FixedRolls {
    rolls: Vec<u32>,
    cursor: usize,
}

impl FixedRolls {
    pub fn new(rolls: impl Into<Vec<u32>>) -> Self {
        Self { rolls: rolls.into(), cursor: 0 }
    }

    /// Number of rolls consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DiceRoller for FixedRolls {
    fn roll_die(&mut self, faces: u32) -> u32 {
        if faces == 0 || self.rolls.is_empty() {
            return 0;
        }
        let value = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        value.clamp(1, faces)
    }
}

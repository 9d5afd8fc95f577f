//! Combat system

pub mod dice;
pub mod damage;

pub use dice::{DamageDice, DiceRoller, FixedRolls};
pub use damage::{resolve_attack, describe_attack, AttackResult, Combatant};

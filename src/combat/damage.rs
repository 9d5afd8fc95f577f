//! Attack resolution
//!
//! A d20 attack roll against armor class, then a damage roll on a hit.

use super::dice::DiceRoller;
use crate::ecs::{CombatStats, Health};

/// The parts of an actor that matter to a single attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combatant {
    pub health: Health,
    pub stats: CombatStats,
}

impl Combatant {
    pub fn new(health: Health, stats: CombatStats) -> Self {
        Self { health, stats }
    }
}

/// Result of a combat attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    /// The natural d20 roll
    pub roll: u32,
    /// Roll plus the attacker's attack bonus
    pub total: i32,
    pub hit: bool,
    /// Damage dealt, 0 on a miss
    pub damage: i32,
    pub defender_hp_after: i32,
    pub defender_died: bool,
}

/// Resolve one attack. Pure: the caller writes `defender_hp_after` back.
///
/// Hit iff `d20 + attack_bonus >= armor_class`. On a hit the attacker's
/// damage dice are rolled and subtracted from the defender's hp, floored at 0.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &Combatant,
    roller: &mut impl DiceRoller,
) -> AttackResult {
    let roll = roller.d20();
    let total = roll as i32 + attacker.stats.attack_bonus;
    let hit = total >= defender.stats.armor_class;

    let mut health = defender.health;
    let damage = if hit {
        let rolled = attacker.stats.damage.roll(roller);
        health.take_damage(rolled);
        rolled
    } else {
        0
    };

    AttackResult {
        roll,
        total,
        hit,
        damage,
        defender_hp_after: health.current,
        defender_died: health.current == 0,
    }
}

/// Narrate an attack for the message log
pub fn describe_attack(attacker: &str, defender: &str, result: &AttackResult) -> String {
    let verb_subject = capitalize(attacker);
    if !result.hit {
        return format!("{} {} {}.", verb_subject, verb(attacker, "miss"), defender);
    }
    if result.defender_died {
        return format!(
            "{} {} {} for {} damage, killing {}!",
            verb_subject,
            verb(attacker, "hit"),
            defender,
            result.damage,
            pronoun(defender)
        );
    }
    format!(
        "{} {} {} for {} damage.",
        verb_subject,
        verb(attacker, "hit"),
        defender,
        result.damage
    )
}

fn verb(subject: &str, base: &str) -> String {
    if subject == "you" {
        base.to_string()
    } else if base.ends_with('s') {
        format!("{}es", base)
    } else {
        format!("{}s", base)
    }
}

fn pronoun(object: &str) -> &'static str {
    if object == "you" {
        "you"
    } else {
        "it"
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

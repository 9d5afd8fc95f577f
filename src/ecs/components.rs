//! ECS Components
//!
//! All components attached to actors living in a level's `hecs::World`.

use serde::{Deserialize, Serialize};

use crate::combat::DamageDice;

// ============================================================================
// Position & Movement
// ============================================================================

/// Position in the game world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Position shifted by a delta
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

/// The eight compass directions an actor can step in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Step delta; north is negative y
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    /// Inverse of [`Direction::delta`] for unit steps
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }
}

// ============================================================================
// Identity
// ============================================================================

/// What an actor is. The kind selects the AI policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    GiantRat,
    Goblin,
    Orc,
}

/// Behaviour driving an actor during the enemy phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPolicy {
    /// Driven by player intents
    None,
    /// Close in on the player when it is in sight, wander otherwise
    GreedyChase,
}

impl EntityKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player => "you",
            EntityKind::GiantRat => "giant rat",
            EntityKind::Goblin => "goblin",
            EntityKind::Orc => "orc",
        }
    }

    pub fn glyph(&self) -> char {
        match self {
            EntityKind::Player => '@',
            EntityKind::GiantRat => 'r',
            EntityKind::Goblin => 'g',
            EntityKind::Orc => 'o',
        }
    }

    pub fn ai_policy(&self) -> AiPolicy {
        match self {
            EntityKind::Player => AiPolicy::None,
            EntityKind::GiantRat | EntityKind::Goblin | EntityKind::Orc => AiPolicy::GreedyChase,
        }
    }

    pub fn is_hostile(&self) -> bool {
        self.ai_policy() != AiPolicy::None
    }
}

/// Kind tag component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kind(pub EntityKind);

/// Marks an entity as the player
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Marks an entity as an enemy
#[derive(Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Monotonic spawn counter, used to give the enemy phase a stable order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpawnOrder(pub u64);

// ============================================================================
// Combat Stats
// ============================================================================

/// Health pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, never dropping below zero. Returns damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current.max(0));
        self.current -= actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// Attack and defence numbers used by the attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub damage: DamageDice,
}

/// Complete stat block, as authored in config and handed to spawning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: i32,
    pub armor_class: i32,
    pub attack_bonus: i32,
    pub damage: DamageDice,
}

impl StatBlock {
    pub fn new(hp: i32, armor_class: i32, attack_bonus: i32, damage: DamageDice) -> Self {
        Self { hp, armor_class, attack_bonus, damage }
    }

    pub fn health(&self) -> Health {
        Health::new(self.hp)
    }

    pub fn combat(&self) -> CombatStats {
        CombatStats {
            armor_class: self.armor_class,
            attack_bonus: self.attack_bonus,
            damage: self.damage,
        }
    }
}

// ============================================================================
// Progression
// ============================================================================

/// XP granted to whoever kills this entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpReward(pub u32);

/// Accumulated experience (the player only)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub xp: u32,
}

impl Experience {
    pub fn gain(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let a = Position::new(2, 3);
        assert_eq!(a.chebyshev_distance(&Position::new(5, 4)), 3);
        assert_eq!(a.chebyshev_distance(&a), 0);
    }

    #[test]
    fn test_direction_round_trip() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn test_health_floors_at_zero() {
        let mut hp = Health::new(5);
        assert_eq!(hp.take_damage(9), 5);
        assert_eq!(hp.current, 0);
        assert!(hp.is_dead());
        assert_eq!(hp.take_damage(3), 0);
    }

    #[test]
    fn test_kind_policy() {
        assert_eq!(EntityKind::Player.ai_policy(), AiPolicy::None);
        assert!(EntityKind::Goblin.is_hostile());
        assert!(!EntityKind::Player.is_hostile());
    }
}

//! Enemy templates for data-driven enemy creation
//!
//! Templates are loaded with the rest of the config and picked per level
//! by depth.

use serde::{Deserialize, Serialize};

use crate::combat::DamageDice;
use crate::ecs::{EntityKind, StatBlock};

/// A template for creating enemies from external data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Which kind this template spawns
    pub kind: EntityKind,
    /// Stats at depth 1, before scaling
    pub stats: StatBlock,
    /// XP reward for killing, before scaling
    pub xp_value: u32,
    /// Shallowest depth this enemy appears on
    pub min_depth: u32,
    /// Relative spawn weight among eligible templates
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl EnemyTemplate {
    pub fn is_eligible(&self, depth: u32) -> bool {
        self.kind.is_hostile() && self.min_depth <= depth && self.weight > 0
    }
}

/// Templates allowed on `depth`, in authored order
pub fn eligible_templates(templates: &[EnemyTemplate], depth: u32) -> Vec<&EnemyTemplate> {
    templates.iter().filter(|t| t.is_eligible(depth)).collect()
}

/// Create default enemy templates (hardcoded fallback)
pub fn default_enemy_templates() -> Vec<EnemyTemplate> {
    vec![
        EnemyTemplate {
            kind: EntityKind::GiantRat,
            stats: StatBlock::new(4, 10, 2, DamageDice::new(1, 4, 0)),
            xp_value: 2,
            min_depth: 1,
            weight: 3,
        },
        EnemyTemplate {
            kind: EntityKind::Goblin,
            stats: StatBlock::new(7, 12, 4, DamageDice::new(1, 6, 0)),
            xp_value: 5,
            min_depth: 1,
            weight: 3,
        },
        EnemyTemplate {
            kind: EntityKind::Orc,
            stats: StatBlock::new(15, 13, 5, DamageDice::new(1, 8, 2)),
            xp_value: 12,
            min_depth: 3,
            weight: 2,
        },
    ]
}

/// Template for `kind`, if one is authored
pub fn template_for(templates: &[EnemyTemplate], kind: EntityKind) -> Option<&EnemyTemplate> {
    templates.iter().find(|t| t.kind == kind)
}

//! Depth-based scaling
//!
//! Enemy strength, numbers and rewards as pure functions of depth. Every
//! curve is non-decreasing: deeper is never easier.

use serde::{Deserialize, Serialize};

use crate::ecs::StatBlock;

/// Depth scaling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthScaling {
    /// Extra hit points per depth below the first
    pub hp_per_depth: i32,
    /// +1 attack bonus every this many depths (0 disables)
    pub attack_bonus_step: u32,
    /// +1 armor class every this many depths (0 disables)
    pub armor_class_step: u32,
    /// +1 damage modifier every this many depths (0 disables)
    pub damage_step: u32,
    /// Extra XP per kill per depth below the first
    pub xp_per_depth: u32,
    /// Enemies on the first level
    pub base_enemy_count: u32,
    /// Extra enemies per depth below the first
    pub enemies_per_depth: u32,
    /// Hard cap on enemies per level
    pub max_enemies: u32,
    /// Enemies never spawn within this Chebyshev distance of the spawn point
    pub min_spawn_distance: i32,
}

impl Default for DepthScaling {
    fn default() -> Self {
        Self {
            hp_per_depth: 2,
            attack_bonus_step: 2,
            armor_class_step: 3,
            damage_step: 4,
            xp_per_depth: 2,
            base_enemy_count: 4,
            enemies_per_depth: 1,
            max_enemies: 24,
            min_spawn_distance: 6,
        }
    }
}

impl DepthScaling {
    /// Depths below the first (0 on depth 1)
    fn below(depth: u32) -> u32 {
        depth.saturating_sub(1)
    }

    fn steps(depth: u32, every: u32) -> i32 {
        if every == 0 {
            0
        } else {
            i32::try_from(Self::below(depth) / every).unwrap_or(i32::MAX)
        }
    }

    /// Scale an enemy's base stat block to `depth`. Saturates instead of
    /// overflowing on extreme config values.
    pub fn scale_stats(&self, base: StatBlock, depth: u32) -> StatBlock {
        let below = i32::try_from(Self::below(depth)).unwrap_or(i32::MAX);
        let mut damage = base.damage;
        damage.modifier = damage.modifier.saturating_add(Self::steps(depth, self.damage_step));

        StatBlock {
            hp: base.hp.saturating_add(self.hp_per_depth.max(0).saturating_mul(below)),
            armor_class: base
                .armor_class
                .saturating_add(Self::steps(depth, self.armor_class_step)),
            attack_bonus: base
                .attack_bonus
                .saturating_add(Self::steps(depth, self.attack_bonus_step)),
            damage,
        }
    }

    /// XP awarded for a kill at `depth`
    pub fn scale_xp(&self, base_xp: u32, depth: u32) -> u32 {
        base_xp.saturating_add(self.xp_per_depth.saturating_mul(Self::below(depth)))
    }

    /// Number of enemies to populate a fresh level with
    pub fn enemy_count(&self, depth: u32) -> usize {
        let count = self
            .base_enemy_count
            .saturating_add(self.enemies_per_depth.saturating_mul(Self::below(depth)));
        count.min(self.max_enemies) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::DamageDice;

    fn goblin() -> StatBlock {
        StatBlock::new(7, 12, 4, DamageDice::new(1, 6, 0))
    }

    #[test]
    fn test_depth_one_is_unscaled() {
        let scaling = DepthScaling::default();
        assert_eq!(scaling.scale_stats(goblin(), 1), goblin());
        assert_eq!(scaling.scale_xp(5, 1), 5);
        assert_eq!(scaling.enemy_count(1), 4);
    }

    #[test]
    fn test_extreme_hp_per_depth_saturates() {
        let scaling = DepthScaling { hp_per_depth: i32::MAX, ..DepthScaling::default() };
        assert_eq!(scaling.scale_stats(goblin(), 1).hp, 7);
        assert_eq!(scaling.scale_stats(goblin(), 3).hp, i32::MAX);
        assert_eq!(scaling.scale_stats(goblin(), u32::MAX).hp, i32::MAX);
    }

    #[test]
    fn test_scaling_is_monotone() {
        let scaling = DepthScaling::default();
        let mut previous = scaling.scale_stats(goblin(), 1);
        for depth in 2..40 {
            let current = scaling.scale_stats(goblin(), depth);
            assert!(current.hp >= previous.hp);
            assert!(current.attack_bonus >= previous.attack_bonus);
            assert!(current.armor_class >= previous.armor_class);
            assert!(current.damage.modifier >= previous.damage.modifier);
            assert!(scaling.enemy_count(depth) >= scaling.enemy_count(depth - 1));
            assert!(scaling.scale_xp(5, depth) >= scaling.scale_xp(5, depth - 1));
            previous = current;
        }
        assert!(previous.hp > goblin().hp);
        assert!(previous.attack_bonus > goblin().attack_bonus);
    }

    #[test]
    fn test_specific_depth() {
        let scaling = DepthScaling::default();
        let deep = scaling.scale_stats(goblin(), 5);
        assert_eq!(deep.hp, 15);
        assert_eq!(deep.attack_bonus, 6);
        assert_eq!(deep.armor_class, 13);
        assert_eq!(deep.damage, DamageDice::new(1, 6, 1));
    }

    #[test]
    fn test_enemy_count_capped() {
        let scaling = DepthScaling { max_enemies: 6, ..DepthScaling::default() };
        assert_eq!(scaling.enemy_count(100), 6);
    }
}

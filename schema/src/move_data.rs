use crate::{ElementType, StatModifier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of moves a single Pokemon can know.
pub const MAXIMUM_MOVE_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    User,
    Target,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::User => write!(f, "User"),
            Target::Target => write!(f, "Target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    /// Damage scaled by type effectiveness and the attack/defense stats.
    Damage { base_damage: u16, hit_chance: f64 },
    /// Exactly `amount` damage whenever the move hits.
    FixedDamage { amount: u16, hit_chance: f64 },
    /// A buff (`Target::User`) or debuff (`Target::Target`) lasting `rounds` rounds.
    StatModifier {
        target: Target,
        modifier: StatModifier,
        rounds: u8,
    },
    /// Restores health to the user.
    Heal { amount: u16 },
    NoEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    #[serde(default)]
    pub name: String,
    pub element_type: ElementType,
    pub max_uses: u8,
    /// Higher priority moves resolve first.
    #[serde(default)]
    pub priority: i8,
    pub effect: MoveEffect,
}

impl MoveEffect {
    /// The side whose active Pokemon receives this effect.
    pub fn target(&self) -> Target {
        match self {
            MoveEffect::Damage { .. } | MoveEffect::FixedDamage { .. } => Target::Target,
            MoveEffect::StatModifier { target, .. } => *target,
            MoveEffect::Heal { .. } | MoveEffect::NoEffect => Target::User,
        }
    }

    /// Whether the move needs a non-fainted opponent to do anything.
    pub fn is_offensive(&self) -> bool {
        self.target() == Target::Target
    }

    pub fn hit_chance(&self) -> Option<f64> {
        match self {
            MoveEffect::Damage { hit_chance, .. } | MoveEffect::FixedDamage { hit_chance, .. } => {
                Some(*hit_chance)
            }
            _ => None,
        }
    }
}

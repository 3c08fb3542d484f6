use serde::{Deserialize, Serialize};

/// Stat growth applied to health, attack and defense on every level up.
pub const LEVEL_UP_STAT_GROWTH: f64 = 1.05;

/// The four battle stats of a Pokemon. None of them may go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hit_chance: f64,
    pub max_health: u16,
    pub attack: u16,
    pub defense: u16,
}

/// A signed change to each of the four stats, used by buffs and debuffs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatModifier {
    pub hit_chance: f64,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
}

impl StatBlock {
    pub fn new(hit_chance: f64, max_health: u16, attack: u16, defense: u16) -> Self {
        Self {
            hit_chance,
            max_health,
            attack,
            defense,
        }
    }

    /// Returns the stats after applying `modifier`, clamping every stat at zero.
    pub fn apply_modifier(&self, modifier: &StatModifier) -> StatBlock {
        fn shift(value: u16, change: i32) -> u16 {
            (value as i32 + change).clamp(0, u16::MAX as i32) as u16
        }

        StatBlock {
            hit_chance: (self.hit_chance + modifier.hit_chance).max(0.0),
            max_health: shift(self.max_health, modifier.max_health),
            attack: shift(self.attack, modifier.attack),
            defense: shift(self.defense, modifier.defense),
        }
    }

    /// Grows the stats for one level: hit chance resets to 1.0 and the rest grow by 5%.
    pub fn level_up(&mut self) {
        fn grow(value: u16) -> u16 {
            (value as f64 * LEVEL_UP_STAT_GROWTH).floor().min(u16::MAX as f64) as u16
        }

        self.hit_chance = 1.0;
        self.max_health = grow(self.max_health);
        self.attack = grow(self.attack);
        self.defense = grow(self.defense);
    }
}

impl StatModifier {
    pub fn combine(&self, other: &StatModifier) -> StatModifier {
        StatModifier {
            hit_chance: self.hit_chance + other.hit_chance,
            max_health: self.max_health + other.max_health,
            attack: self.attack + other.attack,
            defense: self.defense + other.defense,
        }
    }
}

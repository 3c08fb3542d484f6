use crate::{ElementType, StatBlock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of Pokemon on a trainer's roster.
pub const MAXIMUM_POKEMON_ROSTER: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    #[serde(default)]
    pub name: String,
    pub element_type: ElementType,
    pub stats: StatBlock,
    /// Moves a freshly created Pokemon of this species knows, in slot order.
    #[serde(default)]
    pub moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonTemplate {
    pub species: String,
    #[serde(default = "default_level")]
    pub level: u8,
    /// Overrides the species' default moves when present.
    #[serde(default)]
    pub moves: Option<Vec<String>>,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainerTemplate {
    pub roster: Vec<PokemonTemplate>,
    #[serde(default)]
    pub inventory: BTreeMap<String, u32>,
}

fn default_level() -> u8 {
    1
}

use crate::{ItemData, MoveData, SpeciesData, TrainerTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every species, move, item and trainer the game knows about, keyed by name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTable {
    pub species: BTreeMap<String, SpeciesData>,
    pub moves: BTreeMap<String, MoveData>,
    pub items: BTreeMap<String, ItemData>,
    pub trainers: BTreeMap<String, TrainerTemplate>,
}

impl DataTable {
    pub fn species(&self, name: &str) -> Option<&SpeciesData> {
        self.species.get(name)
    }

    pub fn move_data(&self, name: &str) -> Option<&MoveData> {
        self.moves.get(name)
    }

    pub fn item(&self, name: &str) -> Option<&ItemData> {
        self.items.get(name)
    }

    pub fn trainer(&self, name: &str) -> Option<&TrainerTemplate> {
        self.trainers.get(name)
    }

    /// Copies each map key into the `name` field of its entry, so entries can omit it.
    pub fn fill_names(&mut self) {
        for (name, species) in self.species.iter_mut() {
            species.name = name.clone();
        }
        for (name, move_data) in self.moves.iter_mut() {
            move_data.name = name.clone();
        }
    }
}

//! Loading and validation of the game data file.
//!
//! The data file is a RON document with four maps keyed by name:
//!
//! ```ron
//! (
//!     species: { "Pikachu": (element_type: Electric, stats: (...), moves: ["Thunder Shock"]) },
//!     moves: { "Thunder Shock": (element_type: Electric, max_uses: 30, effect: Damage(...)) },
//!     items: { "Potion": Food(health_restored: 20) },
//!     trainers: { "Ash": (roster: [(species: "Pikachu", level: 5)], inventory: {"Potion": 2}) },
//! )
//! ```

use crate::errors::{DataError, DataResult};
use schema::{
    DataTable, ItemData, MoveData, MoveEffect, SpeciesData, TrainerTemplate, MAXIMUM_MOVE_SLOTS,
    MAXIMUM_POKEMON_ROSTER,
};
use std::path::Path;

pub const MAXIMUM_LEVEL: u8 = 100;

/// Loading, validation and checked lookups for [`DataTable`].
pub trait DataTableExt: Sized {
    fn load(path: impl AsRef<Path>) -> DataResult<Self>;
    fn from_ron_str(source: &str) -> DataResult<Self>;
    fn validate(&self) -> DataResult<()>;
    fn require_species(&self, name: &str) -> DataResult<&SpeciesData>;
    fn require_move(&self, name: &str) -> DataResult<&MoveData>;
    fn require_item(&self, name: &str) -> DataResult<&ItemData>;
    fn require_trainer(&self, name: &str) -> DataResult<&TrainerTemplate>;
}

impl DataTableExt for DataTable {
    fn load(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_ron_str(&source)?;
        log::debug!(
            "Loaded {} species, {} moves, {} items and {} trainers from {}",
            table.species.len(),
            table.moves.len(),
            table.items.len(),
            table.trainers.len(),
            path.display()
        );
        Ok(table)
    }

    fn from_ron_str(source: &str) -> DataResult<Self> {
        let mut table: DataTable = ron::from_str(source)?;
        table.fill_names();
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> DataResult<()> {
        for (name, species) in &self.species {
            if species.stats.max_health == 0 {
                return Err(invalid(name, "max health must be positive"));
            }
            if species.moves.len() > MAXIMUM_MOVE_SLOTS {
                return Err(invalid(name, "knows more than four moves"));
            }
            for move_name in &species.moves {
                self.require_move(move_name)?;
            }
        }

        for (name, move_data) in &self.moves {
            if let Some(hit_chance) = move_data.effect.hit_chance() {
                if !(0.0..=1.0).contains(&hit_chance) {
                    return Err(invalid(name, "hit chance must be between 0 and 1"));
                }
            }
            if let MoveEffect::StatModifier { rounds: 0, .. } = move_data.effect {
                return Err(invalid(name, "stat modifiers must last at least one round"));
            }
        }

        for (name, item) in &self.items {
            if let ItemData::Pokeball { catch_chance } = item {
                if !(0.0..=1.0).contains(catch_chance) {
                    return Err(invalid(name, "catch chance must be between 0 and 1"));
                }
            }
        }

        for (name, trainer) in &self.trainers {
            if trainer.roster.is_empty() || trainer.roster.len() > MAXIMUM_POKEMON_ROSTER {
                return Err(invalid(name, "rosters hold between one and six Pokemon"));
            }
            for template in &trainer.roster {
                self.require_species(&template.species)?;
                if template.level == 0 || template.level > MAXIMUM_LEVEL {
                    return Err(invalid(name, "levels run from 1 to 100"));
                }
                if let Some(moves) = &template.moves {
                    if moves.len() > MAXIMUM_MOVE_SLOTS {
                        return Err(invalid(name, "a Pokemon knows at most four moves"));
                    }
                    for move_name in moves {
                        self.require_move(move_name)?;
                    }
                }
            }
            for item_name in trainer.inventory.keys() {
                self.require_item(item_name)?;
            }
        }

        Ok(())
    }

    fn require_species(&self, name: &str) -> DataResult<&SpeciesData> {
        self.species(name)
            .ok_or_else(|| DataError::UnknownSpecies(name.to_string()))
    }

    fn require_move(&self, name: &str) -> DataResult<&MoveData> {
        self.move_data(name)
            .ok_or_else(|| DataError::UnknownMove(name.to_string()))
    }

    fn require_item(&self, name: &str) -> DataResult<&ItemData> {
        self.item(name)
            .ok_or_else(|| DataError::UnknownItem(name.to_string()))
    }

    fn require_trainer(&self, name: &str) -> DataResult<&TrainerTemplate> {
        self.trainer(name)
            .ok_or_else(|| DataError::UnknownTrainer(name.to_string()))
    }
}

fn invalid(name: &str, reason: &str) -> DataError {
    DataError::InvalidEntry {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemData {
    /// Restores health to the user's active Pokemon.
    Food { health_restored: u16 },
    /// Attempts to catch a wild Pokemon.
    Pokeball { catch_chance: f64 },
}

impl ItemData {
    pub fn is_pokeball(&self) -> bool {
        matches!(self, ItemData::Pokeball { .. })
    }
}

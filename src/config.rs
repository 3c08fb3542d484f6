use crate::battle::state::BattleType;
use crate::errors::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-battle settings.
///
/// Loadable from RON, e.g. `(battle_type: Wild, seed: Some(7))`. Missing fields
/// fall back to a trainer battle with a seed taken from the OS.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub battle_type: BattleType,
    pub seed: Option<u64>,
}

impl BattleConfig {
    pub fn trainer() -> Self {
        Self::default()
    }

    pub fn wild() -> Self {
        Self {
            battle_type: BattleType::Wild,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_ron_str(source: &str) -> DataResult<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> DataResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&source)
    }
}

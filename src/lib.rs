//! Pokemon Battle Engine
//!
//! A turn-based battle system between two trainers, driven entirely by a RON
//! data file of species, moves, items and trainers.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod config;
pub mod data;
pub mod errors;
pub mod player;
pub mod pokemon;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
// Re-export the data definitions so users only need this crate.
pub use schema::{
    DataTable, ElementType, ItemData, MoveData, MoveEffect, PokemonTemplate, SpeciesData,
    StatBlock, StatModifier, Target, TrainerTemplate, MAXIMUM_MOVE_SLOTS, MAXIMUM_POKEMON_ROSTER,
};

// --- From this crate's modules (`src/`) ---

// The battle facade and its snapshots.
pub use battle::runner::{
    Battle, BattleSnapshot, MoveSnapshot, PokemonSnapshot, SideStatus, TrainerSnapshot, TurnResult,
};

// Lower-level engine functions and state.
pub use battle::ai::{Behavior, ScaredyCat, ScoringAI, TeamRocket};
pub use battle::engine::{ready_for_turn_resolution, resolve_turn, validate_player_action};
pub use battle::state::{BattleEvent, BattleState, BattleType, GameState, TurnRng};

// Core runtime types for a battle.
pub use player::{PlayerAction, Trainer};
pub use pokemon::PokemonInst;

// Data loading and roster building.
pub use config::BattleConfig;
pub use data::DataTableExt;
pub use teams::{create_pokemon, create_trainer, get_trainer_names};

// Crate-specific error and result types.
pub use errors::{
    BattleError, BattleResult, DataError, DataResult, InvalidActionError, InvalidRosterError,
};

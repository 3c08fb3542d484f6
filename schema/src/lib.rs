// Pokemon Battle Schema - Shared data definitions
// This crate contains the plain data types that describe species, moves,
// items and trainers. They are shared between the battle engine and the
// RON data files it loads.

// Re-export the main types
pub use data_table::*;
pub use element_types::*;
pub use item_data::*;
pub use move_data::*;
pub use species_data::*;
pub use stats::*;

pub mod data_table;
pub mod element_types;
pub mod item_data;
pub mod move_data;
pub mod species_data;
pub mod stats;

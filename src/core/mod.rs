//! Core game logic: field generation, race simulation, bankroll

pub mod ledger;
pub mod odds;
pub mod race;

// Re-export commonly used types
pub use ledger::BankrollLedger;
pub use odds::{generate_field, partition_bands, OddsBand, OddsGenerator, DEFAULT_BANDS};
pub use race::{move_chance, rally_bonus, run_race, Race, RaceResult, RaceSnapshot, RaceTicks};

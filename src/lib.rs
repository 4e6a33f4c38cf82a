//! Horse Race - terminal horse race betting game
//!
//! This library provides:
//! - Race field generation with banded odds (one favorite, one long-shot)
//! - Tick-based race simulation with a catch-up rally mechanic
//! - Bankroll ledger with bets, loans and debt repayment
//! - SQLite persistence of the bankroll and betting history
//!
//! # Example
//!
//! ```no_run
//! use horserace::core::{OddsGenerator, Race};
//!
//! let mut rng = rand::rng();
//! let field = OddsGenerator::default().generate_field(&mut rng);
//! let result = Race::new(field.clone(), 37)?.run(&mut rng);
//! println!("{} wins", field.horses[result.winner].name);
//! # Ok::<(), horserace::GameError>(())
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod display;
pub mod error;
pub mod models;
pub mod session;
pub mod stats;

// Re-export commonly used types
pub use config::GameConfig;
pub use data::{HistoryStore, MemoryHistoryStore, SqliteHistoryStore};
pub use error::{GameError, Result};
pub use models::{BetOutcome, BetRecord, Horse, HorseColor, PlayerState, RaceField, Wager};
pub use session::Session;

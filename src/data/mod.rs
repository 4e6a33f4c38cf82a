//! Persistence for the bankroll and betting history

pub mod history;

// Re-export commonly used types
pub use history::{HistoryStore, MemoryHistoryStore, SqliteHistoryStore};

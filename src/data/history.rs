//! Betting History Store
//!
//! Persists the player's bankroll and an append-only log of settled bets.
//!
//! Tables:
//! - player_state: single row holding balance and debt
//! - betting_history: one row per settled bet, newest has the highest id
//!
//! Resetting progress means deleting the database file.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::models::{BetOutcome, BetRecord, PlayerState};

/// Storage for player state and bet history
pub trait HistoryStore {
    /// Saved player state, if any
    fn load(&self) -> Result<Option<PlayerState>>;

    /// Overwrite the saved player state
    fn save(&mut self, state: &PlayerState) -> Result<()>;

    /// Add a settled bet to the log
    fn append(&mut self, record: &BetRecord) -> Result<()>;

    /// Up to `limit` records, most recent first
    fn recent_history(&self, limit: usize) -> Result<Vec<BetRecord>>;
}

impl ToSql for BetOutcome {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BetOutcome {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS player_state (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            balance REAL NOT NULL,
            debt REAL NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS betting_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            horse_name TEXT NOT NULL,
            odds INTEGER NOT NULL,
            bet_amount REAL NOT NULL,
            win_amount REAL NOT NULL,
            result TEXT NOT NULL CHECK (result IN ('WON', 'LOST')),
            balance REAL NOT NULL,
            debt REAL NOT NULL
        )
        "#,
        [],
    )?;

    Ok(())
}

/// SQLite-backed history store
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Throwaway store that lives as long as the process
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        create_tables(&conn)?;
        Ok(Self { conn })
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn load(&self) -> Result<Option<PlayerState>> {
        let state = self
            .conn
            .query_row(
                "SELECT balance, debt FROM player_state WHERE id = 1",
                [],
                |row| Ok(PlayerState::new(row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(state)
    }

    fn save(&mut self, state: &PlayerState) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO player_state (id, balance, debt) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET balance = excluded.balance, debt = excluded.debt
            "#,
            params![state.balance, state.debt],
        )?;
        Ok(())
    }

    fn append(&mut self, record: &BetRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO betting_history
                (timestamp, horse_name, odds, bet_amount, win_amount, result, balance, debt)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.timestamp,
                record.horse_name,
                record.odds,
                record.bet_amount,
                record.win_amount,
                record.result,
                record.balance,
                record.debt,
            ],
        )?;
        Ok(())
    }

    fn recent_history(&self, limit: usize) -> Result<Vec<BetRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, horse_name, odds, bet_amount, win_amount, result, balance, debt
            FROM betting_history
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let records = stmt
            .query_map(params![limit as i64], |row| {
                Ok(BetRecord {
                    timestamp: row.get(0)?,
                    horse_name: row.get(1)?,
                    odds: row.get(2)?,
                    bet_amount: row.get(3)?,
                    win_amount: row.get(4)?,
                    result: row.get(5)?,
                    balance: row.get(6)?,
                    debt: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }
}

/// In-process store, used in tests and when the database cannot be opened
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    state: Option<PlayerState>,
    records: Vec<BetRecord>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a saved state
    pub fn with_state(state: PlayerState) -> Self {
        Self {
            state: Some(state),
            records: Vec::new(),
        }
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<Option<PlayerState>> {
        Ok(self.state)
    }

    fn save(&mut self, state: &PlayerState) -> Result<()> {
        self.state = Some(*state);
        Ok(())
    }

    fn append(&mut self, record: &BetRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn recent_history(&self, limit: usize) -> Result<Vec<BetRecord>> {
        Ok(self.records.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(name: &str, won: bool, minute: u32) -> BetRecord {
        BetRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 4, 12, minute, 0).unwrap(),
            horse_name: name.to_string(),
            odds: 5,
            bet_amount: 20.0,
            win_amount: if won { 100.0 } else { 0.0 },
            result: if won { BetOutcome::Won } else { BetOutcome::Lost },
            balance: if won { 180.0 } else { 80.0 },
            debt: 0.0,
        }
    }

    #[test]
    fn test_sqlite_load_empty() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(store.recent_history(10).unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_save_overwrites_singleton() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store.save(&PlayerState::new(100.0, 0.0)).unwrap();
        store.save(&PlayerState::new(42.5, 59.95)).unwrap();

        assert_eq!(store.load().unwrap(), Some(PlayerState::new(42.5, 59.95)));

        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM player_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_sqlite_recent_history_newest_first() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        store.append(&record("Thunder", false, 1)).unwrap();
        store.append(&record("Comet", true, 2)).unwrap();
        store.append(&record("Dash", false, 3)).unwrap();

        let recent = store.recent_history(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].horse_name, "Dash");
        assert_eq!(recent[1].horse_name, "Comet");
        assert_eq!(recent[1], record("Comet", true, 2));
        assert_eq!(store.recent_history(10).unwrap().len(), 3);
    }

    #[test]
    fn test_sqlite_names_are_parameterized() {
        let mut store = SqliteHistoryStore::open_in_memory().unwrap();
        let tricky = "Bolt'); DROP TABLE betting_history; --";
        store.append(&record(tricky, true, 5)).unwrap();

        let recent = store.recent_history(1).unwrap();
        assert_eq!(recent[0].horse_name, tricky);
    }

    #[test]
    fn test_sqlite_reopen_file_keeps_data() {
        let path = std::env::temp_dir().join(format!("horserace-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let mut store = SqliteHistoryStore::open(&path).unwrap();
            store.save(&PlayerState::new(180.0, 0.0)).unwrap();
            store.append(&record("Comet", true, 7)).unwrap();
        }

        let store = SqliteHistoryStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap(), Some(PlayerState::new(180.0, 0.0)));
        assert_eq!(store.recent_history(5).unwrap().len(), 1);

        drop(store);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryHistoryStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&PlayerState::new(10.0, 1.0)).unwrap();
        store.append(&record("Arrow", false, 1)).unwrap();
        store.append(&record("Storm", true, 2)).unwrap();

        assert_eq!(store.load().unwrap(), Some(PlayerState::new(10.0, 1.0)));
        let recent = store.recent_history(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].horse_name, "Storm");
        assert_eq!(store.recent_history(1).unwrap().len(), 1);
    }
}

//! Game settings
//!
//! Defaults match the classic six-horse game. A handful of values can be
//! overridden from the environment; there are no command-line flags.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{GameError, Result};

/// Width of the `>=>` marker drawn for each horse
pub const HORSE_MARKER_WIDTH: u32 = 3;

/// Game configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub horse_count: usize,
    /// Drawn track width in cells
    pub track_length: u32,
    /// Position at which a horse wins
    pub finish_line: u32,
    /// Balance for a brand new player
    pub starting_balance: f64,
    /// Upper bound on a single wager
    pub max_bet: f64,
    /// Upper bound on a single loan
    pub max_loan: f64,
    /// Loan interest, charged up front (0.199 = 19.9%)
    pub interest_rate: f64,
    /// Pause between animation frames
    pub tick_interval_ms: u64,
    /// Rows shown on the history screen
    pub history_limit: usize,
    pub db_path: PathBuf,
    /// Fixed RNG seed for reproducible races
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let track_length = 40;
        Self {
            horse_count: 6,
            track_length,
            finish_line: track_length - HORSE_MARKER_WIDTH,
            starting_balance: 100.0,
            max_bet: 500.0,
            max_loan: 1000.0,
            interest_rate: 0.199,
            tick_interval_ms: 100,
            history_limit: 10,
            db_path: PathBuf::from("horserace.db"),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `HORSERACE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`GameConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("HORSERACE_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(seed) = parse_var(&lookup, "HORSERACE_SEED")? {
            config.seed = Some(seed);
        }
        if let Some(ms) = parse_var(&lookup, "HORSERACE_TICK_MS")? {
            config.tick_interval_ms = ms;
        }
        if let Some(balance) = parse_var(&lookup, "HORSERACE_START_BALANCE")? {
            config.starting_balance = balance;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.horse_count < 2 {
            return Err(GameError::Config(format!(
                "At least 2 horses required, got {}",
                self.horse_count
            )));
        }
        if self.finish_line == 0 || self.finish_line > self.track_length {
            return Err(GameError::Config(format!(
                "Finish line {} must be within the track (1-{})",
                self.finish_line, self.track_length
            )));
        }
        if !(self.starting_balance.is_finite() && self.starting_balance >= 0.0) {
            return Err(GameError::Config(format!(
                "Starting balance must be non-negative, got {}",
                self.starting_balance
            )));
        }
        if !(self.max_bet.is_finite() && self.max_bet > 0.0) {
            return Err(GameError::Config(format!(
                "Maximum bet must be positive, got {}",
                self.max_bet
            )));
        }
        if !(self.max_loan.is_finite() && self.max_loan > 0.0) {
            return Err(GameError::Config(format!(
                "Maximum loan must be positive, got {}",
                self.max_loan
            )));
        }
        if !(self.interest_rate.is_finite() && self.interest_rate >= 0.0) {
            return Err(GameError::Config(format!(
                "Interest rate must be non-negative, got {}",
                self.interest_rate
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GameError::Config(format!("{} has an invalid value: {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.horse_count, 6);
        assert_eq!(config.finish_line, 37);
        assert!((config.interest_rate - 0.199).abs() < 1e-12);
        assert!((config.max_loan - 1000.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = GameConfig::from_lookup(lookup_from(&[
            ("HORSERACE_DB", "/tmp/races.db"),
            ("HORSERACE_SEED", "42"),
            ("HORSERACE_TICK_MS", "0"),
            ("HORSERACE_START_BALANCE", "250.5"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/races.db"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.tick_interval_ms, 0);
        assert!((config.starting_balance - 250.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = GameConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.db_path, PathBuf::from("horserace.db"));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = GameConfig::from_lookup(lookup_from(&[("HORSERACE_SEED", "lucky")])).unwrap_err();
        assert!(matches!(err, GameError::Config(_)));

        let err =
            GameConfig::from_lookup(lookup_from(&[("HORSERACE_START_BALANCE", "-5")])).unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_validate_finish_line() {
        let config = GameConfig {
            finish_line: 41,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            finish_line: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_horse_count() {
        let config = GameConfig {
            horse_count: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display color of a horse. Has no effect on the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorseColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

impl HorseColor {
    pub const ALL: [HorseColor; 6] = [
        HorseColor::Red,
        HorseColor::Green,
        HorseColor::Yellow,
        HorseColor::Blue,
        HorseColor::Magenta,
        HorseColor::Cyan,
    ];

    /// Color for a display slot, cycling through the palette
    pub fn for_slot(slot: usize) -> Self {
        Self::ALL[slot % Self::ALL.len()]
    }
}

/// A single runner. Lives for one race round only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horse {
    pub name: String,
    /// Payout multiplier, 2..=30
    pub odds: u32,
    pub position: u32,
    pub color: HorseColor,
}

impl Horse {
    pub fn new(name: impl Into<String>, odds: u32, color: HorseColor) -> Self {
        Self {
            name: name.into(),
            odds,
            position: 0,
            color,
        }
    }
}

/// Ordered runners for one round, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceField {
    pub horses: Vec<Horse>,
}

impl RaceField {
    pub fn new(horses: Vec<Horse>) -> Self {
        Self { horses }
    }

    pub fn len(&self) -> usize {
        self.horses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.horses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Horse> {
        self.horses.get(index)
    }

    pub fn positions(&self) -> Vec<u32> {
        self.horses.iter().map(|h| h.position).collect()
    }

    /// Highest position on the track
    pub fn lead_position(&self) -> u32 {
        self.horses.iter().map(|h| h.position).max().unwrap_or(0)
    }
}

/// Persistent bankroll. Balance and debt are independently non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub balance: f64,
    pub debt: f64,
}

impl PlayerState {
    pub fn new(balance: f64, debt: f64) -> Self {
        Self { balance, debt }
    }

    /// Loans are only offered once the balance is used up
    pub fn is_broke(&self) -> bool {
        self.balance <= 0.0
    }
}

/// Settled result of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetOutcome {
    Won,
    Lost,
}

impl BetOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetOutcome::Won => "WON",
            BetOutcome::Lost => "LOST",
        }
    }
}

impl fmt::Display for BetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WON" => Ok(BetOutcome::Won),
            "LOST" => Ok(BetOutcome::Lost),
            other => Err(format!("Unknown bet result: {}", other)),
        }
    }
}

/// A wager that has been deducted from the balance but not yet settled
///
/// Only [`Session::place_bet`](crate::Session::place_bet) creates one, and
/// settling consumes it, so each stake pays out at most once.
#[derive(Debug, PartialEq)]
pub struct Wager {
    horse_index: usize,
    horse_name: String,
    odds: u32,
    amount: f64,
}

impl Wager {
    pub(crate) fn new(horse_index: usize, horse: &Horse, amount: f64) -> Self {
        Self {
            horse_index,
            horse_name: horse.name.clone(),
            odds: horse.odds,
            amount,
        }
    }

    pub fn horse_index(&self) -> usize {
        self.horse_index
    }

    pub fn horse_name(&self) -> &str {
        &self.horse_name
    }

    pub fn odds(&self) -> u32 {
        self.odds
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Immutable history entry for a settled bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetRecord {
    pub timestamp: DateTime<Utc>,
    pub horse_name: String,
    pub odds: u32,
    pub bet_amount: f64,
    /// Zero when the bet lost
    pub win_amount: f64,
    pub result: BetOutcome,
    pub balance: f64,
    pub debt: f64,
}

impl BetRecord {
    pub fn won(&self) -> bool {
        self.result == BetOutcome::Won
    }

    /// Net change to the bankroll caused by this bet
    pub fn profit(&self) -> f64 {
        self.win_amount - self.bet_amount
    }
}

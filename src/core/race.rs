//! Race Simulation
//!
//! Tick-based movement model. Each tick every horse rolls against its
//! move chance:
//!
//! ```text
//! base   = 45 - odds
//! bonus  = min(4 * distance_behind_leader, 25)   (doubled on a 5% super rally)
//! chance = clamp(base + bonus, 20, 60)            (percent)
//! ```
//!
//! A horse that moves advances one cell, or three cells on a 20% roll
//! when it was rallying. The leader is measured once at the start of
//! the tick. The first horse to reach the finish line wins and ends the
//! tick immediately, so simultaneous finishers resolve to the lowest index.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GameError, Result};
use crate::models::RaceField;

/// Base move chance before subtracting odds
pub const BASE_MOVE_CHANCE: u32 = 45;

/// Move chance floor and ceiling (percent)
pub const MIN_MOVE_CHANCE: u32 = 20;
pub const MAX_MOVE_CHANCE: u32 = 60;

/// Rally bonus per cell behind the leader
pub const RALLY_PER_CELL: u32 = 4;
pub const MAX_RALLY_BONUS: u32 = 25;

/// Chance that a rally bonus doubles this tick
pub const SUPER_RALLY_PROBABILITY: f64 = 0.05;

/// Chance that a rallying horse covers three cells instead of one
pub const SURGE_PROBABILITY: f64 = 0.20;
pub const SURGE_DISTANCE: u32 = 3;

/// Catch-up bonus for a horse `distance_behind` cells off the lead
pub fn rally_bonus(distance_behind: u32) -> u32 {
    distance_behind
        .saturating_mul(RALLY_PER_CELL)
        .min(MAX_RALLY_BONUS)
}

/// Move chance in percent for a horse with `odds` and a rally `bonus`
pub fn move_chance(odds: u32, bonus: u32) -> u32 {
    let base = BASE_MOVE_CHANCE as i64 - odds as i64;
    (base + bonus as i64).clamp(MIN_MOVE_CHANCE as i64, MAX_MOVE_CHANCE as i64) as u32
}

/// Random decisions made for each horse during a tick
trait TickDice {
    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform roll in `0..100`
    fn percent(&mut self) -> u32;
}

struct RngDice<'a, R: ?Sized>(&'a mut R);

impl<R: Rng + ?Sized> TickDice for RngDice<'_, R> {
    fn chance(&mut self, p: f64) -> bool {
        self.0.random_bool(p)
    }

    fn percent(&mut self) -> u32 {
        self.0.random_range(0..100u32)
    }
}

/// Positions after a tick, plus the winner once there is one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub tick: u32,
    pub positions: Vec<u32>,
    pub winner: Option<usize>,
}

/// Outcome of a race run to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub winner: usize,
    pub ticks: u32,
}

/// A race in progress
#[derive(Debug, Clone)]
pub struct Race {
    field: RaceField,
    finish_line: u32,
    tick: u32,
    winner: Option<usize>,
}

impl Race {
    /// Start a race; every horse begins at position 0
    ///
    /// # Errors
    /// `Config` when the field has no horses, since such a race never ends.
    pub fn new(mut field: RaceField, finish_line: u32) -> Result<Self> {
        if field.is_empty() {
            return Err(GameError::Config("A race needs at least one horse".to_string()));
        }
        for horse in &mut field.horses {
            horse.position = 0;
        }
        Ok(Self {
            field,
            finish_line,
            tick: 0,
            winner: None,
        })
    }

    pub fn field(&self) -> &RaceField {
        &self.field
    }

    pub fn finish_line(&self) -> u32 {
        self.finish_line
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            tick: self.tick,
            positions: self.field.positions(),
            winner: self.winner,
        }
    }

    /// Advance every horse by one tick
    ///
    /// Returns the winner's index once the race is over. Stepping a
    /// finished race is a no-op.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        self.step_with(&mut RngDice(rng))
    }

    fn step_with<D: TickDice>(&mut self, dice: &mut D) -> Option<usize> {
        if self.winner.is_some() {
            return self.winner;
        }

        self.tick += 1;
        let lead = self.field.lead_position();

        for (i, horse) in self.field.horses.iter_mut().enumerate() {
            let distance_behind = lead - horse.position;
            let mut bonus = rally_bonus(distance_behind);
            if bonus > 0 && dice.chance(SUPER_RALLY_PROBABILITY) {
                bonus *= 2;
            }

            let chance = move_chance(horse.odds, bonus);
            if dice.percent() < chance {
                let advance = if bonus > 0 && dice.chance(SURGE_PROBABILITY) {
                    SURGE_DISTANCE
                } else {
                    1
                };
                horse.position += advance;

                if horse.position >= self.finish_line {
                    self.winner = Some(i);
                    break;
                }
            }
        }

        if let Some(winner) = self.winner {
            info!(
                "Race finished after {} ticks: {} wins at {}:1",
                self.tick, self.field.horses[winner].name, self.field.horses[winner].odds
            );
        } else {
            debug!("Tick {}: positions {:?}", self.tick, self.field.positions());
        }

        self.winner
    }

    /// Run eagerly until a horse finishes
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> RaceResult {
        loop {
            if let Some(winner) = self.step(rng) {
                return RaceResult {
                    winner,
                    ticks: self.tick,
                };
            }
        }
    }

    /// Lazily step the race, yielding a snapshot after every tick
    ///
    /// The last snapshot carries the winner; the iterator ends after it.
    pub fn ticks<'a, R: Rng + ?Sized>(&'a mut self, rng: &'a mut R) -> RaceTicks<'a, R> {
        RaceTicks { race: self, rng }
    }
}

/// Iterator returned by [`Race::ticks`]
pub struct RaceTicks<'a, R: Rng + ?Sized> {
    race: &'a mut Race,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Iterator for RaceTicks<'_, R> {
    type Item = RaceSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.race.is_finished() {
            return None;
        }
        self.race.step(&mut *self.rng);
        Some(self.race.snapshot())
    }
}

/// Run a fresh race over `field` and return the winner's index
pub fn run_race<R: Rng + ?Sized>(
    rng: &mut R,
    field: RaceField,
    finish_line: u32,
) -> Result<usize> {
    Ok(Race::new(field, finish_line)?.run(rng).winner)
}

//! Game Session
//!
//! Ties the ledger to the history store for one player. State is saved at
//! two points per round: after the wager is deducted and after the race is
//! settled. Store failures are logged and play continues in memory.

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::{BankrollLedger, OddsBand, OddsGenerator, Race};
use crate::data::HistoryStore;
use crate::error::{GameError, Result};
use crate::models::{BetOutcome, BetRecord, PlayerState, RaceField, Wager};
use crate::stats::{calculate_summary, BettingSummary};

pub struct Session {
    config: GameConfig,
    ledger: BankrollLedger,
    generator: OddsGenerator,
    store: Box<dyn HistoryStore>,
    state: PlayerState,
}

impl Session {
    /// Load the saved player, or start a new one at the configured balance
    ///
    /// # Errors
    /// `Config` when the settings are invalid or the odds bands cannot be
    /// built for the horse count.
    pub fn open(config: GameConfig, store: Box<dyn HistoryStore>) -> Result<Self> {
        config.validate()?;
        let generator = OddsGenerator::with_horse_count(config.horse_count)?;
        let ledger = BankrollLedger::from_config(&config);

        let state = match store.load() {
            Ok(Some(state)) => {
                info!(
                    "Loaded player: balance {:.2}, debt {:.2}",
                    state.balance, state.debt
                );
                state
            }
            Ok(None) => {
                info!("New player with balance {:.2}", config.starting_balance);
                PlayerState::new(config.starting_balance, 0.0)
            }
            Err(e) => {
                warn!("Failed to load player state: {}. Starting fresh.", e);
                PlayerState::new(config.starting_balance, 0.0)
            }
        };

        Ok(Self {
            config,
            ledger,
            generator,
            store,
            state,
        })
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn ledger(&self) -> &BankrollLedger {
        &self.ledger
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A loan is required before the next bet
    pub fn needs_loan(&self) -> bool {
        self.state.is_broke()
    }

    pub fn max_bet(&self) -> f64 {
        self.ledger.max_bet_for(&self.state)
    }

    pub fn max_repayment(&self) -> f64 {
        self.ledger.max_repayment_for(&self.state)
    }

    /// Odds bands the fields are drawn from, favorite first
    pub fn odds_bands(&self) -> &[OddsBand] {
        self.generator.bands()
    }

    /// Draw the field for the next race
    pub fn new_field<R: Rng + ?Sized>(&self, rng: &mut R) -> RaceField {
        self.generator.generate_field(rng)
    }

    pub fn take_loan(&mut self, amount: f64) -> Result<PlayerState> {
        self.state = self.ledger.grant_loan(&self.state, amount)?;
        info!(
            "Loan of {:.2} taken, debt now {:.2}",
            amount, self.state.debt
        );
        self.persist();
        Ok(self.state)
    }

    pub fn repay(&mut self, amount: f64) -> Result<PlayerState> {
        self.state = self.ledger.repay_debt(&self.state, amount)?;
        info!("Repaid {:.2}, debt now {:.2}", amount, self.state.debt);
        self.persist();
        Ok(self.state)
    }

    /// Deduct a wager on `field[horse_index]` and save before the race runs
    pub fn place_bet(
        &mut self,
        field: &RaceField,
        horse_index: usize,
        amount: f64,
    ) -> Result<Wager> {
        let horse = field.get(horse_index).ok_or_else(|| {
            GameError::InvalidBet(format!(
                "Horse {} is not in the race (1-{})",
                horse_index + 1,
                field.len()
            ))
        })?;

        self.state = self.ledger.place_bet(&self.state, amount)?;
        self.persist();

        Ok(Wager::new(horse_index, horse, amount))
    }

    /// Settle a wager against the race winner, log it and save
    pub fn settle(&mut self, wager: Wager, winner_index: usize) -> BetRecord {
        let (result, win_amount) = if wager.horse_index() == winner_index {
            let (next, winnings) = self.ledger.settle_win(&self.state, wager.amount(), wager.odds());
            self.state = next;
            (BetOutcome::Won, winnings)
        } else {
            self.state = self.ledger.settle_loss(&self.state);
            (BetOutcome::Lost, 0.0)
        };

        let record = BetRecord {
            timestamp: Utc::now(),
            horse_name: wager.horse_name().to_string(),
            odds: wager.odds(),
            bet_amount: wager.amount(),
            win_amount,
            result,
            balance: self.state.balance,
            debt: self.state.debt,
        };

        info!(
            "Bet on {} {}: stake {:.2}, paid {:.2}",
            record.horse_name, record.result, record.bet_amount, record.win_amount
        );

        if let Err(e) = self.store.append(&record) {
            warn!("Failed to record bet: {}", e);
        }
        self.persist();

        record
    }

    /// Run `race` to the finish if it is still going, then settle against its winner
    pub fn settle_race<R: Rng + ?Sized>(
        &mut self,
        wager: Wager,
        race: &mut Race,
        rng: &mut R,
    ) -> BetRecord {
        if !race.is_finished() {
            debug!("Finishing race from tick {} before settling", race.snapshot().tick);
        }
        let result = race.run(rng);
        self.settle(wager, result.winner)
    }

    /// Up to `limit` settled bets, newest first. Empty if the store fails.
    pub fn recent_history(&self, limit: usize) -> Vec<BetRecord> {
        self.store.recent_history(limit).unwrap_or_else(|e| {
            warn!("Failed to read betting history: {}", e);
            Vec::new()
        })
    }

    /// Statistics over the last `limit` bets
    pub fn summary(&self, limit: usize) -> BettingSummary {
        let mut bets = self.recent_history(limit);
        bets.reverse();
        calculate_summary(&bets)
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!("Failed to save player state: {}", e);
        }
    }
}

//! Bankroll Ledger
//!
//! Balance and debt bookkeeping. Every operation takes the current
//! [`PlayerState`] and returns the next one, or an error with the state
//! untouched.
//!
//! Bets are deducted when placed, before the race runs; settlement only
//! ever adds winnings. Loans are only granted on an empty balance and add
//! principal plus flat interest to the debt:
//!
//! ```text
//! balance' = balance + amount
//! debt'    = debt + amount * (1 + interest_rate)
//! ```

use tracing::debug;

use crate::config::GameConfig;
use crate::error::{validate_finite, GameError, Result};
use crate::models::PlayerState;

/// Ledger rules
#[derive(Debug, Clone, Copy)]
pub struct BankrollLedger {
    pub max_bet: f64,
    pub max_loan: f64,
    pub interest_rate: f64,
}

impl BankrollLedger {
    pub fn new(max_bet: f64, max_loan: f64, interest_rate: f64) -> Self {
        Self {
            max_bet,
            max_loan,
            interest_rate,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_bet, config.max_loan, config.interest_rate)
    }

    /// Largest wager currently allowed: min(balance, cap)
    pub fn max_bet_for(&self, state: &PlayerState) -> f64 {
        state.balance.min(self.max_bet).max(0.0)
    }

    /// Largest repayment currently allowed: min(balance, debt)
    pub fn max_repayment_for(&self, state: &PlayerState) -> f64 {
        state.balance.min(state.debt).max(0.0)
    }

    /// Total owed for a loan of `amount`
    pub fn loan_cost(&self, amount: f64) -> f64 {
        amount * (1.0 + self.interest_rate)
    }

    /// Validate a wager without applying it
    pub fn check_bet(&self, state: &PlayerState, amount: f64) -> Result<()> {
        validate_finite(amount, "Bet").map_err(GameError::InvalidBet)?;
        if amount <= 0.0 {
            return Err(GameError::InvalidBet(format!(
                "Bet must be positive, got {:.2}",
                amount
            )));
        }
        if amount > state.balance {
            return Err(GameError::InvalidBet(format!(
                "Bet {:.2} exceeds balance {:.2}",
                amount, state.balance
            )));
        }
        if amount > self.max_bet {
            return Err(GameError::InvalidBet(format!(
                "Bet {:.2} exceeds the {:.2} limit",
                amount, self.max_bet
            )));
        }
        Ok(())
    }

    /// Deduct a wager from the balance
    pub fn place_bet(&self, state: &PlayerState, amount: f64) -> Result<PlayerState> {
        self.check_bet(state, amount)?;
        debug!("Bet placed: {:.2} (balance {:.2})", amount, state.balance);
        Ok(PlayerState {
            balance: state.balance - amount,
            debt: state.debt,
        })
    }

    /// Validate a loan without applying it
    pub fn check_loan(&self, state: &PlayerState, amount: f64) -> Result<()> {
        validate_finite(amount, "Loan").map_err(GameError::InvalidLoan)?;
        if !state.is_broke() {
            return Err(GameError::InvalidLoan(format!(
                "Loans are only available with an empty balance (balance {:.2})",
                state.balance
            )));
        }
        if amount <= 0.0 {
            return Err(GameError::InvalidLoan(format!(
                "Loan must be positive, got {:.2}",
                amount
            )));
        }
        if amount > self.max_loan {
            return Err(GameError::InvalidLoan(format!(
                "Loan {:.2} exceeds the {:.2} limit",
                amount, self.max_loan
            )));
        }
        Ok(())
    }

    /// Credit a loan to the balance and charge principal plus interest to the debt
    pub fn grant_loan(&self, state: &PlayerState, amount: f64) -> Result<PlayerState> {
        self.check_loan(state, amount)?;
        let cost = self.loan_cost(amount);
        debug!("Loan granted: {:.2} (owed {:.2})", amount, cost);
        Ok(PlayerState {
            balance: state.balance + amount,
            debt: state.debt + cost,
        })
    }

    /// Pay out a winning bet. Returns the new state and the winnings.
    pub fn settle_win(&self, state: &PlayerState, bet_amount: f64, odds: u32) -> (PlayerState, f64) {
        let winnings = bet_amount * odds as f64;
        let next = PlayerState {
            balance: state.balance + winnings,
            debt: state.debt,
        };
        (next, winnings)
    }

    /// A losing bet was already deducted when placed
    pub fn settle_loss(&self, state: &PlayerState) -> PlayerState {
        *state
    }

    /// Validate a repayment without applying it
    pub fn check_repayment(&self, state: &PlayerState, amount: f64) -> Result<()> {
        validate_finite(amount, "Repayment").map_err(GameError::InvalidRepayment)?;
        if amount < 0.0 {
            return Err(GameError::InvalidRepayment(format!(
                "Repayment cannot be negative, got {:.2}",
                amount
            )));
        }
        let limit = self.max_repayment_for(state);
        if amount > limit {
            return Err(GameError::InvalidRepayment(format!(
                "Repayment {:.2} exceeds the {:.2} you can pay (balance {:.2}, debt {:.2})",
                amount, limit, state.balance, state.debt
            )));
        }
        Ok(())
    }

    /// Pay `amount` off the debt out of the balance
    pub fn repay_debt(&self, state: &PlayerState, amount: f64) -> Result<PlayerState> {
        self.check_repayment(state, amount)?;
        debug!("Debt repaid: {:.2} (debt {:.2})", amount, state.debt);
        Ok(PlayerState {
            balance: state.balance - amount,
            debt: state.debt - amount,
        })
    }
}

impl Default for BankrollLedger {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ledger() -> BankrollLedger {
        BankrollLedger::new(500.0, 1000.0, 0.199)
    }

    #[test]
    fn test_place_bet_deducts() {
        let state = PlayerState::new(100.0, 0.0);
        let next = ledger().place_bet(&state, 20.0).unwrap();
        assert!((next.balance - 80.0).abs() < EPS);
        assert_eq!(next.debt, 0.0);
    }

    #[test]
    fn test_place_bet_invalid() {
        let state = PlayerState::new(100.0, 0.0);
        let l = ledger();

        assert!(matches!(l.place_bet(&state, 0.0), Err(GameError::InvalidBet(_))));
        assert!(matches!(l.place_bet(&state, -5.0), Err(GameError::InvalidBet(_))));
        assert!(matches!(l.place_bet(&state, 100.01), Err(GameError::InvalidBet(_))));
        assert!(matches!(l.place_bet(&state, f64::NAN), Err(GameError::InvalidBet(_))));
        assert!(l.place_bet(&state, 100.0).is_ok());
    }

    #[test]
    fn test_place_bet_respects_cap() {
        let state = PlayerState::new(2000.0, 0.0);
        let l = ledger();
        assert!(matches!(l.place_bet(&state, 500.01), Err(GameError::InvalidBet(_))));
        assert!(l.place_bet(&state, 500.0).is_ok());
        assert!((l.max_bet_for(&state) - 500.0).abs() < EPS);
        assert!((l.max_bet_for(&PlayerState::new(42.0, 0.0)) - 42.0).abs() < EPS);
    }

    #[test]
    fn test_bet_then_loss_keeps_post_bet_balance() {
        let l = ledger();
        let placed = l.place_bet(&PlayerState::new(100.0, 0.0), 30.0).unwrap();
        let settled = l.settle_loss(&placed);
        assert_eq!(settled, placed);
    }

    #[test]
    fn test_bet_then_win_pays_bet_times_odds() {
        let l = ledger();
        let placed = l.place_bet(&PlayerState::new(100.0, 0.0), 20.0).unwrap();
        assert!((placed.balance - 80.0).abs() < EPS);

        let (settled, winnings) = l.settle_win(&placed, 20.0, 5);
        assert!((winnings - 100.0).abs() < EPS);
        assert!((settled.balance - 180.0).abs() < EPS);
        assert!((settled.balance - placed.balance - winnings).abs() < EPS);
    }

    #[test]
    fn test_grant_loan_adds_interest() {
        let state = PlayerState::new(0.0, 0.0);
        let next = ledger().grant_loan(&state, 50.0).unwrap();
        assert!((next.balance - 50.0).abs() < EPS);
        assert!((next.debt - 59.95).abs() < EPS);
    }

    #[test]
    fn test_grant_loan_accumulates_debt() {
        let state = PlayerState::new(0.0, 100.0);
        let next = ledger().grant_loan(&state, 1000.0).unwrap();
        assert!((next.debt - (100.0 + 1199.0)).abs() < EPS);
    }

    #[test]
    fn test_grant_loan_invalid() {
        let l = ledger();
        let broke = PlayerState::new(0.0, 0.0);

        assert!(matches!(l.grant_loan(&broke, 0.0), Err(GameError::InvalidLoan(_))));
        assert!(matches!(l.grant_loan(&broke, -1.0), Err(GameError::InvalidLoan(_))));
        assert!(matches!(l.grant_loan(&broke, 1000.5), Err(GameError::InvalidLoan(_))));

        let solvent = PlayerState::new(0.5, 0.0);
        assert!(matches!(l.grant_loan(&solvent, 50.0), Err(GameError::InvalidLoan(_))));
    }

    #[test]
    fn test_repay_zero_is_noop() {
        let state = PlayerState::new(40.0, 59.95);
        let next = ledger().repay_debt(&state, 0.0).unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn test_repay_max_never_goes_negative() {
        let l = ledger();
        for (balance, debt) in [(40.0, 59.95), (100.0, 12.5), (0.0, 30.0), (7.0, 0.0)] {
            let state = PlayerState::new(balance, debt);
            let amount = l.max_repayment_for(&state);
            let next = l.repay_debt(&state, amount).unwrap();
            assert!(next.balance >= 0.0);
            assert!(next.debt >= 0.0);
        }
    }

    #[test]
    fn test_repay_invalid() {
        let l = ledger();
        let state = PlayerState::new(40.0, 59.95);
        assert!(matches!(l.repay_debt(&state, -1.0), Err(GameError::InvalidRepayment(_))));
        assert!(matches!(l.repay_debt(&state, 40.01), Err(GameError::InvalidRepayment(_))));

        let small_debt = PlayerState::new(100.0, 10.0);
        assert!(matches!(
            l.repay_debt(&small_debt, 10.5),
            Err(GameError::InvalidRepayment(_))
        ));
    }

    #[test]
    fn test_broke_player_needs_loan_before_betting() {
        let l = ledger();
        let broke = PlayerState::new(0.0, 0.0);
        assert!(matches!(l.place_bet(&broke, 1.0), Err(GameError::InvalidBet(_))));

        let funded = l.grant_loan(&broke, 50.0).unwrap();
        assert!((funded.balance - 50.0).abs() < EPS);
        assert!((funded.debt - 59.95).abs() < EPS);
        assert!(l.place_bet(&funded, 50.0).is_ok());
    }
}

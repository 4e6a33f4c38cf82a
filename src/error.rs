use thiserror::Error;

/// Game error types
#[derive(Debug, Error)]
pub enum GameError {
    /// Malformed odds bands, name pool too small, or bad settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Wager rejected by the ledger
    #[error("Invalid bet: {0}")]
    InvalidBet(String),

    /// Loan rejected by the ledger
    #[error("Invalid loan: {0}")]
    InvalidLoan(String),

    /// Debt repayment rejected by the ledger
    #[error("Invalid repayment: {0}")]
    InvalidRepayment(String),

    /// History store unavailable or corrupt
    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl GameError {
    /// User-input failures are fixed by asking again; everything else is not.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GameError::InvalidBet(_) | GameError::InvalidLoan(_) | GameError::InvalidRepayment(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

/// Reject NaN and infinite amounts before any comparison.
pub fn validate_finite(amount: f64, what: &str) -> std::result::Result<(), String> {
    if !amount.is_finite() {
        return Err(format!("{} must be a finite number, got {}", what, amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite(0.0, "Bet").is_ok());
        assert!(validate_finite(12.5, "Bet").is_ok());
        assert!(validate_finite(f64::NAN, "Bet").is_err());
        assert!(validate_finite(f64::INFINITY, "Bet").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = GameError::InvalidBet("test error".to_string());
        assert!(err.to_string().contains("Invalid bet"));

        let err = GameError::Config("pool".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(GameError::InvalidBet(String::new()).is_recoverable());
        assert!(GameError::InvalidLoan(String::new()).is_recoverable());
        assert!(GameError::InvalidRepayment(String::new()).is_recoverable());
        assert!(!GameError::Config(String::new()).is_recoverable());
        assert!(!GameError::Persistence(rusqlite::Error::InvalidQuery).is_recoverable());
    }
}

//! Error types for the Coin Toss engine
//!
//! Three families, kept apart so callers can react differently:
//! bet rejections are expected and go back to the player, invariant
//! violations mean the engine was driven incorrectly, and configuration
//! errors happen before an engine exists.

use thiserror::Error;

/// Root error type for all engine operations
#[derive(Debug, Error)]
pub enum CoinTossError {
    /// Bet parameters or game state refused the bet
    #[error("Bet rejected: {0}")]
    Rejected(#[from] BetRejection),

    /// Engine was driven in a way that breaks its own contract
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Simulation needs a tokio runtime to be spawned on
    #[error("No tokio runtime available to run the game simulation")]
    NoRuntime,

    /// Simulation task panicked or was aborted
    #[error("Simulation task failed: {0}")]
    TaskFailed(String),
}

impl CoinTossError {
    /// Invariant violations are programming errors, everything else is not
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoinTossError::Invariant(_))
    }
}

/// Reasons a bet is refused at placement time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetRejection {
    #[error("numberOfCoins must be <= {max}")]
    TooManyCoins { requested: u32, max: u32 },

    #[error("numberOfCoins must be at least 1")]
    NoCoins,

    #[error("numberCorrect must be <= numberOfCoins ({number_correct} > {number_of_coins})")]
    CorrectExceedsCoins { number_correct: u32, number_of_coins: u32 },

    #[error("wager cannot exceed {max}")]
    WagerTooLarge { wager: f64, max: f64 },

    #[error("wager must be a positive amount, got {0}")]
    InvalidWager(f64),

    #[error("active game in progress (game {game_id}), wait for settlement")]
    ActiveGameInProgress { game_id: u64 },
}

/// Broken engine contract; never expected in a correct program
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("No active game")]
    NoActiveGame,

    #[error("Outcome has {actual} coins but game {game_id} tossed {expected}")]
    OutcomeLength { game_id: u64, expected: u32, actual: usize },
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl From<std::io::Error> for ConfigurationError {
    fn from(e: std::io::Error) -> Self {
        ConfigurationError::LoadFailed(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(e: toml::de::Error) -> Self {
        ConfigurationError::LoadFailed(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        ConfigurationError::LoadFailed(e.to_string())
    }
}

// Convenience type alias for Results
pub type CoinTossResult<T> = Result<T, CoinTossError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_rejection_names_limit() {
        let err = BetRejection::TooManyCoins { requested: 11, max: 10 };
        assert_eq!(err.to_string(), "numberOfCoins must be <= 10");

        let err = BetRejection::WagerTooLarge { wager: 5000.0, max: 1000.0 };
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_error_conversion() {
        let err: CoinTossError = BetRejection::NoCoins.into();
        match err {
            CoinTossError::Rejected(BetRejection::NoCoins) => {}
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_fatal_classification() {
        let invariant: CoinTossError = InvariantViolation::NoActiveGame.into();
        assert!(invariant.is_fatal());
        assert!(invariant.source().is_some());

        let rejected: CoinTossError = BetRejection::ActiveGameInProgress { game_id: 0 }.into();
        assert!(!rejected.is_fatal());
        assert!(rejected.to_string().contains("active game in progress"));
    }
}

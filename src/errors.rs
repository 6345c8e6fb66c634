//! Error types for the gamehall wagering engine
//!
//! Every failure a request can hit is a `GameError`. `GameError::kind` folds the
//! variants onto the small taxonomy callers act on (fix the input, give up, resync,
//! or report an internal fault).

use crate::games::settlement::SettlementError;
use crate::games::types::GameType;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification used by the HTTP layer and by callers deciding whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected before any state mutation; retry with corrected input
    Validation,
    /// Stake could not be reserved
    InsufficientFunds,
    NotFound,
    Forbidden,
    /// Client/UI out of sync with the session, or lost a race
    StateConflict,
    Internal,
}

/// Root error type for all engine operations
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Unknown game type: {0}")]
    UnknownGameType(String),

    #[error("Bet {bet} outside [{min}, {max}] for {game}")]
    InvalidBet {
        game: GameType,
        bet: u64,
        min: u64,
        max: u64,
    },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Session {session_id} belongs to {actual}, not {requested}")]
    GameTypeMismatch {
        session_id: String,
        requested: GameType,
        actual: GameType,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session {0} is owned by another player")]
    Forbidden(String),

    #[error("Session {0} is already completed")]
    SessionAlreadyCompleted(String),

    #[error("Session {0} has nothing to cash out")]
    NotCashoutEligible(String),

    #[error("Cell {0} has already been revealed")]
    CellAlreadyRevealed(usize),

    #[error("No jackpot pool for {0}")]
    NoJackpot(GameType),

    #[error("Insufficient funds to stake {0}")]
    InsufficientFunds(u64),

    #[error("Settlement failed: {0}")]
    Settlement(SettlementError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::UnknownGameType(_)
            | GameError::InvalidBet { .. }
            | GameError::InvalidAction(_)
            | GameError::GameTypeMismatch { .. } => ErrorKind::Validation,
            GameError::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            GameError::SessionNotFound(_) | GameError::NoJackpot(_) => ErrorKind::NotFound,
            GameError::Forbidden(_) => ErrorKind::Forbidden,
            GameError::SessionAlreadyCompleted(_)
            | GameError::NotCashoutEligible(_)
            | GameError::CellAlreadyRevealed(_) => ErrorKind::StateConflict,
            GameError::Settlement(_) | GameError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            GameError::UnknownGameType(_) => "UNKNOWN_GAME",
            GameError::InvalidBet { .. } => "INVALID_BET",
            GameError::InvalidAction(_) => "INVALID_ACTION",
            GameError::GameTypeMismatch { .. } => "GAME_TYPE_MISMATCH",
            GameError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            GameError::Forbidden(_) => "FORBIDDEN",
            GameError::SessionAlreadyCompleted(_) => "SESSION_ALREADY_COMPLETED",
            GameError::NotCashoutEligible(_) => "NOT_CASHOUT_ELIGIBLE",
            GameError::CellAlreadyRevealed(_) => "CELL_ALREADY_REVEALED",
            GameError::NoJackpot(_) => "NO_JACKPOT",
            GameError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            GameError::Settlement(_) => "SETTLEMENT_FAILED",
            GameError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<SettlementError> for GameError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::InsufficientFunds { requested, .. } => {
                GameError::InsufficientFunds(requested)
            }
            other => GameError::Settlement(other),
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(e: toml::de::Error) -> Self {
        ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e))
    }
}

// Convenience type alias for Results
pub type GameResult<T> = Result<T, GameError>;

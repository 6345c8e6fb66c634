//! Multi-game wagering engine
//!
//! Catalog, outcome engines, jackpot pools, settlement and the session
//! lifecycle manager that ties them together.

pub mod catalog;
pub mod engines;
pub mod history;
pub mod jackpot;
pub mod manager;
pub mod rng;
pub mod session;
pub mod settlement;
pub mod types;
pub mod weighted;

pub use catalog::{GameCatalog, GameConfig, GameSummary};
pub use jackpot::{JackpotAccumulator, JackpotPool};
pub use manager::{ActionOutcome, CashoutOutcome, ReapReport, SessionManager, StartOutcome};
pub use rng::{EntropyProvider, RandomSource, RngProvider};
pub use session::{GameSession, PayoutStatus, SessionSnapshot, SessionSummary};
pub use settlement::{InMemoryWallet, SettlementError, SettlementGateway};
pub use types::*;

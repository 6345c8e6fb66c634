//! gamehall - multi-game wagering engine
//!
//! Session-oriented outcome engines for seven mini-games, a shared progressive
//! jackpot, two-phase wallet settlement and an axum HTTP surface.

pub mod api;
pub mod config;
pub mod errors;
pub mod games;
pub mod metrics;

pub use config::{ConfigLoader, GameHallConfig};
pub use errors::{ConfigurationError, ErrorKind, GameError, GameResult};
pub use games::{GameCatalog, GameType, SessionManager};
pub use metrics::GameMetrics;

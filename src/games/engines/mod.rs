//! Outcome engines, one per game type
//!
//! Each engine turns (session state, player action, randomness) into a `Step`.
//! Engines validate the action before touching the state, so a rejected action
//! leaves the session exactly as it was.

pub mod card_flip;
pub mod coin_toss;
pub mod dice;
pub mod lucky_number;
pub mod slots;
pub mod treasure;
pub mod wheel;

use crate::errors::{GameError, GameResult};
use crate::games::catalog::{GameCatalog, PayoutTable};
use crate::games::jackpot::JackpotAccumulator;
use crate::games::rng::RandomSource;
use crate::games::types::{GameState, GameType, PlayerAction, Step};
use std::collections::HashMap;

pub use card_flip::CardFlipEngine;
pub use coin_toss::CoinTossEngine;
pub use dice::DiceEngine;
pub use lucky_number::LuckyNumberEngine;
pub use slots::SlotsEngine;
pub use treasure::TreasureEngine;
pub use wheel::WheelEngine;

/// Everything an engine may consult while resolving one action
pub struct EngineContext<'a> {
    pub session_id: &'a str,
    pub user_id: &'a str,
    pub bet: u64,
    pub rng: &'a mut dyn RandomSource,
    pub jackpot: &'a JackpotAccumulator,
}

/// Common initialize / act / settle contract
pub trait OutcomeEngine: Send + Sync {
    fn game_type(&self) -> GameType;

    /// Produce the initial state payload for a new session
    fn initialize(&self, bet: u64, rng: &mut dyn RandomSource) -> GameResult<GameState>;

    /// Resolve one player action against the current state
    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step>;

    /// Amount a cashout would pay right now, if the state has positive accrued value
    fn accrued_payout(&self, _state: &GameState, _bet: u64) -> Option<u64> {
        None
    }

    /// Whether an abandoned session with nothing accrued may be voided with a
    /// refund. False when the initial state already shows the player something
    /// that bears on the outcome.
    fn refundable_on_expiry(&self) -> bool {
        true
    }
}

/// State payload did not match the engine it was routed to
pub(crate) fn state_mismatch(expected: GameType, state: &GameState) -> GameError {
    GameError::Internal(format!(
        "{} engine received {} state",
        expected,
        state.game_type()
    ))
}

/// Engines resolved once from the catalog at startup
pub struct EngineRegistry {
    engines: HashMap<GameType, Box<dyn OutcomeEngine>>,
}

impl EngineRegistry {
    pub fn from_catalog(catalog: &GameCatalog) -> Self {
        let engines = catalog
            .configs()
            .map(|config| {
                let engine: Box<dyn OutcomeEngine> = match &config.table {
                    PayoutTable::Wheel(table) => Box::new(WheelEngine::new(table.clone())),
                    PayoutTable::Dice(table) => Box::new(DiceEngine::new(table.clone())),
                    PayoutTable::CardFlip(table) => Box::new(CardFlipEngine::new(table.clone())),
                    PayoutTable::Treasure(table) => Box::new(TreasureEngine::new(table.clone())),
                    PayoutTable::LuckyNumber(table) => {
                        Box::new(LuckyNumberEngine::new(table.clone()))
                    }
                    PayoutTable::CoinToss(table) => Box::new(CoinTossEngine::new(table.clone())),
                    PayoutTable::Slots(table) => Box::new(SlotsEngine::new(table.clone())),
                };
                (config.game_type, engine)
            })
            .collect();

        Self { engines }
    }

    pub fn get(&self, game_type: GameType) -> GameResult<&dyn OutcomeEngine> {
        self.engines
            .get(&game_type)
            .map(|engine| engine.as_ref())
            .ok_or_else(|| GameError::Internal(format!("no engine registered for {}", game_type)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_catalog_game() {
        let catalog = GameCatalog::standard();
        let registry = EngineRegistry::from_catalog(&catalog);
        for game in GameType::ALL {
            assert_eq!(registry.get(game).unwrap().game_type(), game);
        }
    }
}

use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::{GameError, GameResult};
use crate::games::rng::RandomSource;
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};

/// Guesses within `max_distance` of the target pay `multiplier`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceBand {
    pub max_distance: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LuckyNumberTable {
    pub min: u32,
    pub max: u32,
    /// Ordered by ascending `max_distance`
    pub bands: Vec<DistanceBand>,
}

impl LuckyNumberTable {
    pub fn standard() -> Self {
        let band = |max_distance, multiplier| DistanceBand {
            max_distance,
            multiplier,
        };
        Self {
            min: 1,
            max: 100,
            bands: vec![band(0, 40.0), band(2, 6.0), band(5, 3.0), band(10, 1.5)],
        }
    }

    pub fn multiplier_for(&self, distance: u32) -> f64 {
        self.bands
            .iter()
            .find(|band| distance <= band.max_distance)
            .map(|band| band.multiplier)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct GuessData {
    number: u32,
}

pub struct LuckyNumberEngine {
    table: LuckyNumberTable,
}

impl LuckyNumberEngine {
    pub fn new(table: LuckyNumberTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for LuckyNumberEngine {
    fn game_type(&self) -> GameType {
        GameType::LuckyNumber
    }

    fn initialize(&self, _bet: u64, _rng: &mut dyn RandomSource) -> GameResult<GameState> {
        Ok(GameState::LuckyNumber)
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        if !matches!(state, GameState::LuckyNumber) {
            return Err(state_mismatch(GameType::LuckyNumber, state));
        }
        action.expect("guess")?;
        let GuessData { number: guess } = action.decode()?;
        if !(self.table.min..=self.table.max).contains(&guess) {
            return Err(GameError::InvalidAction(format!(
                "guess must be between {} and {}, got {}",
                self.table.min, self.table.max, guess
            )));
        }

        let target = ctx.rng.range_inclusive(self.table.min, self.table.max);
        let distance = guess.abs_diff(target);
        let multiplier = self.table.multiplier_for(distance);

        Ok(Step::Resolved(FinalResult {
            won: multiplier > 0.0,
            payout: apply_multiplier(ctx.bet, multiplier),
            detail: RoundDetail::LuckyNumber {
                guess,
                target,
                distance,
                multiplier,
            },
        }))
    }
}

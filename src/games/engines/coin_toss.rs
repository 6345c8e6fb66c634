use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::{GameError, GameResult};
use crate::games::rng::RandomSource;
use crate::games::types::{
    apply_multiplier, CoinSide, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CoinTossTable {
    /// Payout for a fully matched sequence, indexed by sequence length - 1
    pub multipliers: Vec<f64>,
}

impl CoinTossTable {
    pub fn standard() -> Self {
        Self {
            multipliers: vec![1.95, 3.8, 7.5],
        }
    }

    pub fn max_rounds(&self) -> usize {
        self.multipliers.len()
    }
}

#[derive(Debug, Deserialize)]
struct FlipData {
    guesses: Vec<CoinSide>,
}

pub struct CoinTossEngine {
    table: CoinTossTable,
}

impl CoinTossEngine {
    pub fn new(table: CoinTossTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for CoinTossEngine {
    fn game_type(&self) -> GameType {
        GameType::CoinToss
    }

    fn initialize(&self, _bet: u64, _rng: &mut dyn RandomSource) -> GameResult<GameState> {
        Ok(GameState::CoinToss)
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        if !matches!(state, GameState::CoinToss) {
            return Err(state_mismatch(GameType::CoinToss, state));
        }
        action.expect("flip")?;
        let FlipData { guesses } = action.decode()?;
        if guesses.is_empty() || guesses.len() > self.table.max_rounds() {
            return Err(GameError::InvalidAction(format!(
                "between 1 and {} guesses required, got {}",
                self.table.max_rounds(),
                guesses.len()
            )));
        }

        // One fair flip per round, stopping at the first miss
        let mut flips = Vec::with_capacity(guesses.len());
        for guess in &guesses {
            let flip = if ctx.rng.range_inclusive(0, 1) == 0 {
                CoinSide::Heads
            } else {
                CoinSide::Tails
            };
            flips.push(flip);
            if flip != *guess {
                break;
            }
        }

        let won = flips == guesses;
        let multiplier = if won {
            self.table.multipliers[guesses.len() - 1]
        } else {
            0.0
        };

        Ok(Step::Resolved(FinalResult {
            won,
            payout: apply_multiplier(ctx.bet, multiplier),
            detail: RoundDetail::CoinToss {
                guesses,
                flips,
                multiplier,
            },
        }))
    }
}

use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::GameResult;
use crate::games::rng::RandomSource;
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use crate::games::weighted::select_index;
use serde::Serialize;

/// One labelled slice of the wheel
#[derive(Debug, Clone, Serialize)]
pub struct WheelSegment {
    pub label: String,
    pub multiplier: f64,
    /// Percent chance of landing here
    pub weight: f64,
}

impl WheelSegment {
    fn new(label: &str, multiplier: f64, weight: f64) -> Self {
        Self {
            label: label.to_string(),
            multiplier,
            weight,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WheelTable {
    pub segments: Vec<WheelSegment>,
    /// Segment chosen when a draw falls past the last cumulative weight
    pub default_segment: usize,
}

impl WheelTable {
    pub fn standard() -> Self {
        Self {
            segments: vec![
                WheelSegment::new("lose", 0.0, 40.0),
                WheelSegment::new("half", 0.5, 20.0),
                WheelSegment::new("one_and_half", 1.5, 20.0),
                WheelSegment::new("double", 2.0, 12.0),
                WheelSegment::new("five", 5.0, 6.0),
                WheelSegment::new("ten", 10.0, 1.5),
                WheelSegment::new("jackpot", 50.0, 0.5),
            ],
            default_segment: 0,
        }
    }

    /// Segment selected by a draw in `[0, 100)`
    pub fn segment_for(&self, draw: f64) -> &WheelSegment {
        let index = select_index(self.segments.iter().map(|s| s.weight), draw)
            .unwrap_or(self.default_segment);
        &self.segments[index]
    }
}

pub struct WheelEngine {
    table: WheelTable,
}

impl WheelEngine {
    pub fn new(table: WheelTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for WheelEngine {
    fn game_type(&self) -> GameType {
        GameType::Wheel
    }

    fn initialize(&self, _bet: u64, _rng: &mut dyn RandomSource) -> GameResult<GameState> {
        Ok(GameState::Wheel)
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        if !matches!(state, GameState::Wheel) {
            return Err(state_mismatch(GameType::Wheel, state));
        }
        action.expect("spin")?;

        let segment = self.table.segment_for(ctx.rng.percent());
        let payout = apply_multiplier(ctx.bet, segment.multiplier);

        Ok(Step::Resolved(FinalResult {
            won: segment.multiplier >= 1.0,
            payout,
            detail: RoundDetail::Wheel {
                segment: segment.label.clone(),
                multiplier: segment.multiplier,
            },
        }))
    }
}

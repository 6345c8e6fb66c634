use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::{GameError, GameResult};
use crate::games::rng::RandomSource;
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};

/// Bet placed together with the roll
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "betType", rename_all = "lowercase")]
pub enum DiceBet {
    /// Sum of 8 or more
    High,
    /// Sum of 6 or less
    Low,
    Seven,
    /// Any matching pair
    Doubles,
    /// Both dice show `value`
    Pair { value: u8 },
}

impl DiceBet {
    pub fn label(&self) -> String {
        match self {
            DiceBet::High => "high".to_string(),
            DiceBet::Low => "low".to_string(),
            DiceBet::Seven => "seven".to_string(),
            DiceBet::Doubles => "doubles".to_string(),
            DiceBet::Pair { value } => format!("pair_{}", value),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiceTable {
    pub high: f64,
    pub low: f64,
    pub seven: f64,
    pub doubles: f64,
    pub pair: f64,
}

impl DiceTable {
    pub fn standard() -> Self {
        Self {
            high: 2.0,
            low: 2.0,
            seven: 5.0,
            doubles: 5.0,
            pair: 30.0,
        }
    }

    /// Multiplier paid for `bet` given the two dice; zero when the bet loses
    pub fn multiplier(&self, bet: DiceBet, dice: [u8; 2]) -> f64 {
        let sum = dice[0] + dice[1];
        let wins = match bet {
            DiceBet::High => sum >= 8,
            DiceBet::Low => sum <= 6,
            DiceBet::Seven => sum == 7,
            DiceBet::Doubles => dice[0] == dice[1],
            DiceBet::Pair { value } => dice[0] == value && dice[1] == value,
        };
        if !wins {
            return 0.0;
        }
        match bet {
            DiceBet::High => self.high,
            DiceBet::Low => self.low,
            DiceBet::Seven => self.seven,
            DiceBet::Doubles => self.doubles,
            DiceBet::Pair { .. } => self.pair,
        }
    }
}

pub struct DiceEngine {
    table: DiceTable,
}

impl DiceEngine {
    pub fn new(table: DiceTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for DiceEngine {
    fn game_type(&self) -> GameType {
        GameType::Dice
    }

    fn initialize(&self, _bet: u64, _rng: &mut dyn RandomSource) -> GameResult<GameState> {
        Ok(GameState::Dice)
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        if !matches!(state, GameState::Dice) {
            return Err(state_mismatch(GameType::Dice, state));
        }
        action.expect("roll")?;
        let bet: DiceBet = action.decode()?;
        if let DiceBet::Pair { value } = bet {
            if !(1..=6).contains(&value) {
                return Err(GameError::InvalidAction(format!(
                    "pair value must be 1-6, got {}",
                    value
                )));
            }
        }

        let dice = [
            ctx.rng.range_inclusive(1, 6) as u8,
            ctx.rng.range_inclusive(1, 6) as u8,
        ];
        let multiplier = self.table.multiplier(bet, dice);

        Ok(Step::Resolved(FinalResult {
            won: multiplier > 0.0,
            payout: apply_multiplier(ctx.bet, multiplier),
            detail: RoundDetail::Dice {
                dice,
                sum: dice[0] + dice[1],
                bet_type: bet.label(),
                multiplier,
            },
        }))
    }
}

//! Three-reel slot feeding the shared progressive jackpot

use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::GameResult;
use crate::games::rng::RandomSource;
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Cherry,
    Lemon,
    Orange,
    Bell,
    Bar,
    Seven,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Lemon => "lemon",
            Symbol::Orange => "orange",
            Symbol::Bell => "bell",
            Symbol::Bar => "bar",
            Symbol::Seven => "seven",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriplePayout {
    pub symbol: Symbol,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsTable {
    /// Each reel draws uniformly from this set
    pub symbols: Vec<Symbol>,
    pub triples: Vec<TriplePayout>,
    /// Paid when two or more reels show a cherry
    pub cherry_pair: f64,
    /// Three of this symbol claims the jackpot instead of a fixed multiplier
    pub jackpot_symbol: Symbol,
}

/// How a set of reels scores against the table
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    Jackpot,
    Win { combination: String, multiplier: f64 },
    Loss,
}

impl SlotsTable {
    pub fn standard() -> Self {
        let triple = |symbol, multiplier| TriplePayout { symbol, multiplier };
        Self {
            symbols: vec![
                Symbol::Cherry,
                Symbol::Lemon,
                Symbol::Orange,
                Symbol::Bell,
                Symbol::Bar,
                Symbol::Seven,
            ],
            triples: vec![
                triple(Symbol::Cherry, 5.0),
                triple(Symbol::Lemon, 8.0),
                triple(Symbol::Orange, 10.0),
                triple(Symbol::Bell, 15.0),
                triple(Symbol::Bar, 25.0),
            ],
            cherry_pair: 1.5,
            jackpot_symbol: Symbol::Seven,
        }
    }

    pub fn evaluate(&self, reels: [Symbol; 3]) -> SlotOutcome {
        let all_match = reels[0] == reels[1] && reels[1] == reels[2];
        if all_match {
            if reels[0] == self.jackpot_symbol {
                return SlotOutcome::Jackpot;
            }
            if let Some(payout) = self.triples.iter().find(|t| t.symbol == reels[0]) {
                return SlotOutcome::Win {
                    combination: format!("triple_{}", reels[0].as_str()),
                    multiplier: payout.multiplier,
                };
            }
        }

        let cherries = reels.iter().filter(|&&s| s == Symbol::Cherry).count();
        if cherries >= 2 {
            return SlotOutcome::Win {
                combination: "cherry_pair".to_string(),
                multiplier: self.cherry_pair,
            };
        }
        SlotOutcome::Loss
    }
}

pub struct SlotsEngine {
    table: SlotsTable,
}

impl SlotsEngine {
    pub fn new(table: SlotsTable) -> Self {
        Self { table }
    }

    fn spin_reel(&self, rng: &mut dyn RandomSource) -> Symbol {
        let last = self.table.symbols.len().saturating_sub(1) as u32;
        self.table.symbols[rng.range_inclusive(0, last) as usize]
    }
}

impl OutcomeEngine for SlotsEngine {
    fn game_type(&self) -> GameType {
        GameType::Slots
    }

    fn initialize(&self, _bet: u64, _rng: &mut dyn RandomSource) -> GameResult<GameState> {
        Ok(GameState::Slots)
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        if !matches!(state, GameState::Slots) {
            return Err(state_mismatch(GameType::Slots, state));
        }
        action.expect("spin")?;

        let reels = [
            self.spin_reel(ctx.rng),
            self.spin_reel(ctx.rng),
            self.spin_reel(ctx.rng),
        ];

        let result = match self.table.evaluate(reels) {
            SlotOutcome::Jackpot => {
                let payout = ctx.jackpot.claim(GameType::Slots, ctx.user_id)?;
                info!(
                    session_id = ctx.session_id,
                    user_id = ctx.user_id,
                    payout,
                    "slots jackpot hit"
                );
                FinalResult {
                    won: true,
                    payout,
                    detail: RoundDetail::Slots {
                        reels,
                        combination: format!("jackpot_{}", self.table.jackpot_symbol.as_str()),
                        multiplier: 0.0,
                        jackpot: true,
                    },
                }
            }
            outcome => {
                ctx.jackpot.contribute_from_bet(GameType::Slots, ctx.bet)?;
                let (combination, multiplier) = match outcome {
                    SlotOutcome::Win {
                        combination,
                        multiplier,
                    } => (combination, multiplier),
                    _ => ("none".to_string(), 0.0),
                };
                FinalResult {
                    won: multiplier > 0.0,
                    payout: apply_multiplier(ctx.bet, multiplier),
                    detail: RoundDetail::Slots {
                        reels,
                        combination,
                        multiplier,
                        jackpot: false,
                    },
                }
            }
        };

        Ok(Step::Resolved(result))
    }
}

//! Treasure box: progressive reveal over a shuffled grid
//!
//! Coins grow the pot by a fixed fraction of the bet, double/triple multiply it
//! (seeding it from the bet while it is still empty), and a bomb wipes the
//! session. The pot can be banked whenever it is positive.

use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::{GameError, GameResult};
use crate::games::rng::{shuffle, RandomSource};
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Coin,
    Bomb,
    Double,
    Triple,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureTable {
    pub coins: usize,
    pub bombs: usize,
    pub doubles: usize,
    pub triples: usize,
    /// Fraction of the bet a coin adds to the pot
    pub coin_fraction: f64,
}

impl TreasureTable {
    pub fn standard() -> Self {
        Self {
            coins: 6,
            bombs: 3,
            doubles: 2,
            triples: 1,
            coin_fraction: 0.5,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.coins + self.bombs + self.doubles + self.triples
    }

    /// Unshuffled multiset of cells
    fn cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.grid_size());
        cells.extend(std::iter::repeat(Cell::Coin).take(self.coins));
        cells.extend(std::iter::repeat(Cell::Bomb).take(self.bombs));
        cells.extend(std::iter::repeat(Cell::Double).take(self.doubles));
        cells.extend(std::iter::repeat(Cell::Triple).take(self.triples));
        cells
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasureState {
    pub grid: Vec<Cell>,
    pub revealed: Vec<bool>,
    pub pot: u64,
}

impl TreasureState {
    pub fn view(&self) -> TreasureView {
        TreasureView {
            grid_size: self.grid.len(),
            cells: self
                .grid
                .iter()
                .zip(&self.revealed)
                .map(|(cell, &open)| open.then_some(*cell))
                .collect(),
            pot: self.pot,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasureView {
    pub grid_size: usize,
    /// `None` for cells not yet revealed
    pub cells: Vec<Option<Cell>>,
    pub pot: u64,
}

#[derive(Debug, Deserialize)]
struct RevealData {
    index: usize,
}

pub struct TreasureEngine {
    table: TreasureTable,
}

impl TreasureEngine {
    pub fn new(table: TreasureTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for TreasureEngine {
    fn game_type(&self) -> GameType {
        GameType::Treasure
    }

    fn initialize(&self, _bet: u64, rng: &mut dyn RandomSource) -> GameResult<GameState> {
        let mut grid = self.table.cells();
        shuffle(rng, &mut grid);
        let revealed = vec![false; grid.len()];
        Ok(GameState::Treasure(TreasureState {
            grid,
            revealed,
            pot: 0,
        }))
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        let treasure = match state {
            GameState::Treasure(treasure) => treasure,
            other => return Err(state_mismatch(GameType::Treasure, other)),
        };
        action.expect("reveal")?;
        let RevealData { index } = action.decode()?;

        if index >= treasure.grid.len() {
            return Err(GameError::InvalidAction(format!(
                "cell index {} outside grid of {}",
                index,
                treasure.grid.len()
            )));
        }
        if treasure.revealed[index] {
            return Err(GameError::CellAlreadyRevealed(index));
        }

        treasure.revealed[index] = true;
        let cell = treasure.grid[index];
        let seed = if treasure.pot == 0 { ctx.bet } else { treasure.pot };

        match cell {
            Cell::Bomb => {
                return Ok(Step::Resolved(FinalResult {
                    won: false,
                    payout: 0,
                    detail: RoundDetail::Treasure {
                        index,
                        cell,
                        pot: treasure.pot,
                    },
                }));
            }
            Cell::Coin => {
                treasure.pot = treasure
                    .pot
                    .saturating_add(apply_multiplier(ctx.bet, self.table.coin_fraction));
            }
            Cell::Double => treasure.pot = seed.saturating_mul(2),
            Cell::Triple => treasure.pot = seed.saturating_mul(3),
        }

        Ok(Step::Continue {
            detail: RoundDetail::Treasure {
                index,
                cell,
                pot: treasure.pot,
            },
            cashout_eligible: treasure.pot > 0,
        })
    }

    fn accrued_payout(&self, state: &GameState, _bet: u64) -> Option<u64> {
        match state {
            GameState::Treasure(treasure) if treasure.pot > 0 => Some(treasure.pot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::engines::test_support;
    use crate::games::rng::ScriptedRandom;
    use serde_json::json;

    fn engine() -> TreasureEngine {
        TreasureEngine::new(TreasureTable::standard())
    }

    fn fixed_state(grid: Vec<Cell>) -> GameState {
        let revealed = vec![false; grid.len()];
        GameState::Treasure(TreasureState {
            grid,
            revealed,
            pot: 0,
        })
    }

    fn reveal(state: &mut GameState, index: usize, bet: u64) -> GameResult<Step> {
        let jackpot = test_support::jackpot();
        let mut rng = ScriptedRandom::new(2);
        test_support::act(
            &engine(),
            state,
            PlayerAction::new("reveal", json!({ "index": index })),
            bet,
            &mut rng,
            &jackpot,
        )
    }

    fn pot(state: &GameState) -> u64 {
        match state {
            GameState::Treasure(treasure) => treasure.pot,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_initial_grid_holds_configured_multiset() {
        let mut rng = ScriptedRandom::new(4);
        let GameState::Treasure(state) = engine().initialize(1000, &mut rng).unwrap() else {
            unreachable!()
        };
        assert_eq!(state.grid.len(), 12);
        let count = |kind: Cell| state.grid.iter().filter(|&&c| c == kind).count();
        assert_eq!(count(Cell::Coin), 6);
        assert_eq!(count(Cell::Bomb), 3);
        assert_eq!(count(Cell::Double), 2);
        assert_eq!(count(Cell::Triple), 1);
        assert!(state.revealed.iter().all(|&open| !open));
    }

    #[test]
    fn test_coin_then_double() {
        let mut state = fixed_state(vec![Cell::Coin, Cell::Double, Cell::Bomb]);
        reveal(&mut state, 0, 10_000).unwrap();
        assert_eq!(pot(&state), 5_000);
        reveal(&mut state, 1, 10_000).unwrap();
        assert_eq!(pot(&state), 10_000);
    }

    #[test]
    fn test_multiplier_on_empty_pot_seeds_from_bet() {
        let mut state = fixed_state(vec![Cell::Triple, Cell::Bomb]);
        let step = reveal(&mut state, 0, 1_000).unwrap();
        assert_eq!(pot(&state), 3_000);
        assert!(matches!(
            step,
            Step::Continue {
                cashout_eligible: true,
                ..
            }
        ));
    }

    #[test]
    fn test_double_reveal_is_rejected_without_mutation() {
        let mut state = fixed_state(vec![Cell::Coin, Cell::Bomb]);
        reveal(&mut state, 0, 1_000).unwrap();
        let before = pot(&state);

        let err = reveal(&mut state, 0, 1_000).unwrap_err();
        assert!(matches!(err, GameError::CellAlreadyRevealed(0)));
        assert_eq!(pot(&state), before);
    }

    #[test]
    fn test_bomb_ends_session_with_nothing() {
        let mut state = fixed_state(vec![Cell::Coin, Cell::Bomb]);
        reveal(&mut state, 0, 1_000).unwrap();
        match reveal(&mut state, 1, 1_000).unwrap() {
            Step::Resolved(result) => {
                assert!(!result.won);
                assert_eq!(result.payout, 0);
            }
            other => panic!("bomb must end the session, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_index_is_invalid() {
        let mut state = fixed_state(vec![Cell::Coin]);
        assert!(matches!(
            reveal(&mut state, 5, 1_000),
            Err(GameError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_clearing_every_safe_cell_stays_active() {
        let mut rng = ScriptedRandom::new(8);
        let mut state = engine().initialize(1_000, &mut rng).unwrap();
        let safe: Vec<usize> = match &state {
            GameState::Treasure(treasure) => treasure
                .grid
                .iter()
                .enumerate()
                .filter(|(_, &cell)| cell != Cell::Bomb)
                .map(|(index, _)| index)
                .collect(),
            _ => unreachable!(),
        };

        let mut last = None;
        for index in safe {
            last = Some(reveal(&mut state, index, 1_000).unwrap());
        }

        assert!(matches!(
            last,
            Some(Step::Continue {
                cashout_eligible: true,
                ..
            })
        ));
        assert!(pot(&state) > 0);
        assert_eq!(engine().accrued_payout(&state, 1_000), Some(pot(&state)));
    }
}

//! Higher/lower card game
//!
//! The session holds a shuffled deck and the face-up card. Each correct guess
//! extends the streak and compounds the accrued multiplier along a fixed ladder;
//! the first wrong guess (ties included) ends the session with nothing.

use super::{state_mismatch, EngineContext, OutcomeEngine};
use crate::errors::{GameError, GameResult};
use crate::games::rng::{shuffle, RandomSource};
use crate::games::types::{
    apply_multiplier, FinalResult, GameState, GameType, PlayerAction, RoundDetail, Step,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

/// Rank runs 2..=14, ace high
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: u8, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

/// A full 52-card deck, shuffled
pub fn shuffled_deck(rng: &mut dyn RandomSource) -> Vec<Card> {
    let mut deck: Vec<Card> = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
        .into_iter()
        .flat_map(|suit| (2..=14).map(move |rank| Card::new(rank, suit)))
        .collect();
    shuffle(rng, &mut deck);
    deck
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Guess {
    Higher,
    Lower,
}

#[derive(Debug, Deserialize)]
struct GuessData {
    guess: Guess,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardFlipTable {
    pub ladder: Vec<f64>,
}

impl CardFlipTable {
    pub fn standard() -> Self {
        Self {
            ladder: vec![1.5, 1.75, 2.0, 2.5, 3.0],
        }
    }

    /// Multiplier applied by the `streak`-th consecutive win (1-based)
    pub fn step_multiplier(&self, streak: u32) -> f64 {
        let last = self.ladder.len().saturating_sub(1);
        let index = (streak.saturating_sub(1) as usize).min(last);
        self.ladder.get(index).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardFlipState {
    pub deck: Vec<Card>,
    pub current: Card,
    pub streak: u32,
    pub accrued_multiplier: f64,
}

impl CardFlipState {
    pub fn view(&self) -> CardFlipView {
        CardFlipView {
            current: self.current,
            streak: self.streak,
            accrued_multiplier: self.accrued_multiplier,
            cards_remaining: self.deck.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFlipView {
    pub current: Card,
    pub streak: u32,
    pub accrued_multiplier: f64,
    pub cards_remaining: usize,
}

pub struct CardFlipEngine {
    table: CardFlipTable,
}

impl CardFlipEngine {
    pub fn new(table: CardFlipTable) -> Self {
        Self { table }
    }
}

impl OutcomeEngine for CardFlipEngine {
    fn game_type(&self) -> GameType {
        GameType::CardFlip
    }

    fn initialize(&self, _bet: u64, rng: &mut dyn RandomSource) -> GameResult<GameState> {
        let mut deck = shuffled_deck(rng);
        let current = deck
            .pop()
            .ok_or_else(|| GameError::Internal("dealt from an empty deck".to_string()))?;
        Ok(GameState::CardFlip(CardFlipState {
            deck,
            current,
            streak: 0,
            accrued_multiplier: 1.0,
        }))
    }

    fn act(
        &self,
        state: &mut GameState,
        action: &PlayerAction,
        ctx: &mut EngineContext<'_>,
    ) -> GameResult<Step> {
        let flip = match state {
            GameState::CardFlip(flip) => flip,
            other => return Err(state_mismatch(GameType::CardFlip, other)),
        };
        action.expect("guess")?;
        let GuessData { guess } = action.decode()?;

        if flip.deck.is_empty() {
            flip.deck = shuffled_deck(ctx.rng);
        }
        let drawn = flip
            .deck
            .pop()
            .ok_or_else(|| GameError::Internal("drew from an empty deck".to_string()))?;

        let previous = flip.current;
        let correct = match guess {
            Guess::Higher => drawn.rank > previous.rank,
            Guess::Lower => drawn.rank < previous.rank,
        };
        flip.current = drawn;

        if !correct {
            return Ok(Step::Resolved(FinalResult {
                won: false,
                payout: 0,
                detail: RoundDetail::CardFlip {
                    previous,
                    drawn,
                    correct,
                    streak: flip.streak,
                    accrued_multiplier: flip.accrued_multiplier,
                },
            }));
        }

        flip.streak += 1;
        flip.accrued_multiplier *= self.table.step_multiplier(flip.streak);

        Ok(Step::Continue {
            detail: RoundDetail::CardFlip {
                previous,
                drawn,
                correct,
                streak: flip.streak,
                accrued_multiplier: flip.accrued_multiplier,
            },
            cashout_eligible: true,
        })
    }

    fn accrued_payout(&self, state: &GameState, bet: u64) -> Option<u64> {
        match state {
            GameState::CardFlip(flip) if flip.streak > 0 => {
                Some(apply_multiplier(bet, flip.accrued_multiplier))
            }
            _ => None,
        }
    }

    // The first card is dealt face up at start
    fn refundable_on_expiry(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::engines::test_support;
    use crate::games::rng::ScriptedRandom;
    use serde_json::json;

    fn state_with(current: u8, upcoming: &[u8]) -> GameState {
        // Deck is drawn from the back
        let deck = upcoming
            .iter()
            .rev()
            .map(|&rank| Card::new(rank, Suit::Spades))
            .collect();
        GameState::CardFlip(CardFlipState {
            deck,
            current: Card::new(current, Suit::Hearts),
            streak: 0,
            accrued_multiplier: 1.0,
        })
    }

    fn guess(state: &mut GameState, direction: &str) -> Step {
        let engine = CardFlipEngine::new(CardFlipTable::standard());
        let jackpot = test_support::jackpot();
        let mut rng = ScriptedRandom::new(9);
        test_support::act(
            &engine,
            state,
            PlayerAction::new("guess", json!({ "guess": direction })),
            1000,
            &mut rng,
            &jackpot,
        )
        .unwrap()
    }

    #[test]
    fn test_tie_is_a_loss_both_ways() {
        for direction in ["higher", "lower"] {
            let mut state = state_with(9, &[9]);
            match guess(&mut state, direction) {
                Step::Resolved(result) => {
                    assert!(!result.won);
                    assert_eq!(result.payout, 0);
                }
                other => panic!("tie must end the session, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_ladder_clamps_to_last_entry() {
        let table = CardFlipTable::standard();
        assert_eq!(table.step_multiplier(1), 1.5);
        assert_eq!(table.step_multiplier(5), 3.0);
        assert_eq!(table.step_multiplier(6), 3.0);
        assert_eq!(table.step_multiplier(40), 3.0);
    }

    #[test]
    fn test_accrued_multiplier_is_product_of_clamped_ladder() {
        let table = CardFlipTable::standard();
        let engine = CardFlipEngine::new(table.clone());
        // Strictly ascending ranks so every "higher" guess wins
        let ranks: Vec<u8> = (3..=9).collect();
        let mut state = state_with(2, &ranks);

        let mut expected = 1.0;
        for n in 1..=ranks.len() as u32 {
            let step = guess(&mut state, "higher");
            expected *= table.step_multiplier(n);
            match step {
                Step::Continue {
                    cashout_eligible, ..
                } => assert!(cashout_eligible),
                other => panic!("win must keep the session going, got {:?}", other),
            }
            let GameState::CardFlip(flip) = &state else {
                unreachable!()
            };
            assert_eq!(flip.streak, n);
            assert!((flip.accrued_multiplier - expected).abs() < 1e-9);
        }

        assert_eq!(
            engine.accrued_payout(&state, 1000),
            Some(apply_multiplier(1000, expected))
        );
    }

    #[test]
    fn test_not_eligible_before_first_win() {
        let engine = CardFlipEngine::new(CardFlipTable::standard());
        let mut rng = ScriptedRandom::new(5);
        let state = engine.initialize(1000, &mut rng).unwrap();
        assert_eq!(engine.accrued_payout(&state, 1000), None);
    }

    #[test]
    fn test_empty_deck_is_replaced() {
        let mut state = state_with(2, &[]);
        let _ = guess(&mut state, "higher");
        let GameState::CardFlip(flip) = &state else {
            unreachable!()
        };
        assert_eq!(flip.deck.len(), 51);
    }

    #[test]
    fn test_fresh_deck_has_52_distinct_cards() {
        let mut rng = ScriptedRandom::new(11);
        let deck = shuffled_deck(&mut rng);
        assert_eq!(deck.len(), 52);
        for (i, a) in deck.iter().enumerate() {
            assert!(deck[i + 1..].iter().all(|b| b != a));
        }
    }
}

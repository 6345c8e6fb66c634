use crate::errors::{GameError, GameResult};
use crate::games::engines::card_flip::{CardFlipState, CardFlipView};
use crate::games::engines::treasure::{TreasureState, TreasureView};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Wheel,
    Dice,
    CardFlip,
    Treasure,
    LuckyNumber,
    CoinToss,
    Slots,
}

impl GameType {
    pub const ALL: [GameType; 7] = [
        GameType::Wheel,
        GameType::Dice,
        GameType::CardFlip,
        GameType::Treasure,
        GameType::LuckyNumber,
        GameType::CoinToss,
        GameType::Slots,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Wheel => "wheel",
            GameType::Dice => "dice",
            GameType::CardFlip => "card_flip",
            GameType::Treasure => "treasure",
            GameType::LuckyNumber => "lucky_number",
            GameType::CoinToss => "coin_toss",
            GameType::Slots => "slots",
        }
    }

    /// Games whose sessions can accrue value over several actions
    pub fn is_push_your_luck(&self) -> bool {
        matches!(self, GameType::CardFlip | GameType::Treasure)
    }

    /// Games that feed and pay the progressive jackpot
    pub fn is_jackpot_eligible(&self) -> bool {
        matches!(self, GameType::Slots)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameType::ALL
            .iter()
            .copied()
            .find(|game| game.as_str() == s)
            .ok_or_else(|| GameError::UnknownGameType(s.to_string()))
    }
}

/// Session lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// Coin side, used by the coin toss game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "heads"),
            CoinSide::Tails => write!(f, "tails"),
        }
    }
}

/// Raw action as received from a client; each engine decodes `data` itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAction {
    pub action: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PlayerAction {
    pub fn new(action: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            action: action.into(),
            data,
        }
    }

    /// Reject anything but the expected action name
    pub fn expect(&self, name: &str) -> GameResult<()> {
        if self.action == name {
            Ok(())
        } else {
            Err(GameError::InvalidAction(format!(
                "expected action '{}', got '{}'",
                name, self.action
            )))
        }
    }

    /// Decode the payload into the engine's typed action data
    pub fn decode<T: DeserializeOwned>(&self) -> GameResult<T> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| GameError::InvalidAction(format!("malformed '{}' data: {}", self.action, e)))
    }
}

/// Game-specific session state; the variant always matches the session's game type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum GameState {
    Wheel,
    Dice,
    CardFlip(CardFlipState),
    Treasure(TreasureState),
    LuckyNumber,
    CoinToss,
    Slots,
}

impl GameState {
    pub fn game_type(&self) -> GameType {
        match self {
            GameState::Wheel => GameType::Wheel,
            GameState::Dice => GameType::Dice,
            GameState::CardFlip(_) => GameType::CardFlip,
            GameState::Treasure(_) => GameType::Treasure,
            GameState::LuckyNumber => GameType::LuckyNumber,
            GameState::CoinToss => GameType::CoinToss,
            GameState::Slots => GameType::Slots,
        }
    }

    /// Player-visible projection (hides the deck and unrevealed cells)
    pub fn view(&self) -> StateView {
        match self {
            GameState::CardFlip(state) => StateView::CardFlip(state.view()),
            GameState::Treasure(state) => StateView::Treasure(state.view()),
            other => StateView::Ready {
                game_type: other.game_type(),
            },
        }
    }
}

/// What a client is allowed to see of an in-progress session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StateView {
    /// Single-action games: nothing to show until the action resolves
    Ready { game_type: GameType },
    CardFlip(CardFlipView),
    Treasure(TreasureView),
}

/// Per-round detail reported back to the player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RoundDetail {
    Wheel {
        segment: String,
        multiplier: f64,
    },
    Dice {
        dice: [u8; 2],
        sum: u8,
        bet_type: String,
        multiplier: f64,
    },
    CardFlip {
        previous: crate::games::engines::card_flip::Card,
        drawn: crate::games::engines::card_flip::Card,
        correct: bool,
        streak: u32,
        accrued_multiplier: f64,
    },
    Treasure {
        index: usize,
        cell: crate::games::engines::treasure::Cell,
        pot: u64,
    },
    LuckyNumber {
        guess: u32,
        target: u32,
        distance: u32,
        multiplier: f64,
    },
    CoinToss {
        guesses: Vec<CoinSide>,
        flips: Vec<CoinSide>,
        multiplier: f64,
    },
    Slots {
        reels: [crate::games::engines::slots::Symbol; 3],
        combination: String,
        multiplier: f64,
        jackpot: bool,
    },
    /// Player banked the accrued value
    Cashout { accrued: u64 },
    /// Session was closed by the abandoned-session reaper
    Expired { refunded: bool },
}

/// Frozen result of a completed session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalResult {
    pub won: bool,
    pub payout: u64,
    pub detail: RoundDetail,
}

/// What an engine returns for one action
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Session stays active
    Continue {
        detail: RoundDetail,
        cashout_eligible: bool,
    },
    /// Session is over
    Resolved(FinalResult),
}

/// `floor(bet × multiplier)`, tolerant of binary representation error in the multiplier
pub fn apply_multiplier(bet: u64, multiplier: f64) -> u64 {
    const EPSILON: f64 = 1e-6;
    (bet as f64 * multiplier + EPSILON).floor() as u64
}

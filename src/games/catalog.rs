//! Static per-game configuration: bet bounds and payout tables
//!
//! Built once at startup and never mutated afterwards.

use crate::errors::{GameError, GameResult};
use crate::games::engines::card_flip::CardFlipTable;
use crate::games::engines::coin_toss::CoinTossTable;
use crate::games::engines::dice::DiceTable;
use crate::games::engines::lucky_number::LuckyNumberTable;
use crate::games::engines::slots::SlotsTable;
use crate::games::engines::treasure::TreasureTable;
use crate::games::engines::wheel::WheelTable;
use crate::games::types::GameType;
use serde::Serialize;
use std::collections::BTreeMap;

/// Game-specific payout/probability table
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "table", rename_all = "snake_case")]
pub enum PayoutTable {
    Wheel(WheelTable),
    Dice(DiceTable),
    CardFlip(CardFlipTable),
    Treasure(TreasureTable),
    LuckyNumber(LuckyNumberTable),
    CoinToss(CoinTossTable),
    Slots(SlotsTable),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub game_type: GameType,
    pub name: String,
    pub min_bet: u64,
    pub max_bet: u64,
    pub table: PayoutTable,
}

impl GameConfig {
    fn new(game_type: GameType, name: &str, min_bet: u64, max_bet: u64, table: PayoutTable) -> Self {
        Self {
            game_type,
            name: name.to_string(),
            min_bet,
            max_bet,
            table,
        }
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_type: self.game_type,
            name: self.name.clone(),
            min_bet: self.min_bet,
            max_bet: self.max_bet,
        }
    }
}

/// Client-facing listing entry
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub name: String,
    pub min_bet: u64,
    pub max_bet: u64,
}

pub struct GameCatalog {
    games: BTreeMap<GameType, GameConfig>,
}

impl GameCatalog {
    pub fn new(configs: impl IntoIterator<Item = GameConfig>) -> Self {
        Self {
            games: configs
                .into_iter()
                .map(|config| (config.game_type, config))
                .collect(),
        }
    }

    /// The production catalog
    pub fn standard() -> Self {
        Self::new([
            GameConfig::new(
                GameType::Wheel,
                "Lucky Wheel",
                100,
                100_000,
                PayoutTable::Wheel(WheelTable::standard()),
            ),
            GameConfig::new(
                GameType::Dice,
                "Dice",
                100,
                100_000,
                PayoutTable::Dice(DiceTable::standard()),
            ),
            GameConfig::new(
                GameType::CardFlip,
                "Higher or Lower",
                100,
                50_000,
                PayoutTable::CardFlip(CardFlipTable::standard()),
            ),
            GameConfig::new(
                GameType::Treasure,
                "Treasure Box",
                500,
                50_000,
                PayoutTable::Treasure(TreasureTable::standard()),
            ),
            GameConfig::new(
                GameType::LuckyNumber,
                "Lucky Number",
                100,
                100_000,
                PayoutTable::LuckyNumber(LuckyNumberTable::standard()),
            ),
            GameConfig::new(
                GameType::CoinToss,
                "Coin Toss",
                100,
                100_000,
                PayoutTable::CoinToss(CoinTossTable::standard()),
            ),
            GameConfig::new(
                GameType::Slots,
                "Jackpot Slots",
                100,
                50_000,
                PayoutTable::Slots(SlotsTable::standard()),
            ),
        ])
    }

    pub fn configs(&self) -> impl Iterator<Item = &GameConfig> {
        self.games.values()
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.games.values().map(GameConfig::summary).collect()
    }

    pub fn get_config(&self, game_type: GameType) -> GameResult<&GameConfig> {
        self.games
            .get(&game_type)
            .ok_or_else(|| GameError::Internal(format!("catalog has no entry for {}", game_type)))
    }

    /// Check `min_bet <= bet <= max_bet`
    pub fn validate_bet(&self, game_type: GameType, bet: u64) -> GameResult<()> {
        let config = self.get_config(game_type)?;
        if bet < config.min_bet || bet > config.max_bet {
            return Err(GameError::InvalidBet {
                game: game_type,
                bet,
                min: config.min_bet,
                max: config.max_bet,
            });
        }
        Ok(())
    }
}

impl Default for GameCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_standard_catalog_lists_every_game() {
        let catalog = GameCatalog::standard();
        let listed: Vec<GameType> = catalog.list_games().iter().map(|g| g.game_type).collect();
        assert_eq!(listed, GameType::ALL.to_vec());
    }

    #[test]
    fn test_bet_bounds_are_inclusive() {
        let catalog = GameCatalog::standard();
        for config in catalog.configs() {
            assert!(catalog.validate_bet(config.game_type, config.min_bet).is_ok());
            assert!(catalog.validate_bet(config.game_type, config.max_bet).is_ok());

            let low = catalog
                .validate_bet(config.game_type, config.min_bet - 1)
                .unwrap_err();
            assert_eq!(low.kind(), ErrorKind::Validation);
            assert!(catalog
                .validate_bet(config.game_type, config.max_bet + 1)
                .is_err());
        }
    }

    #[test]
    fn test_summary_wire_shape() {
        let catalog = GameCatalog::standard();
        let summary = catalog.get_config(GameType::Treasure).unwrap().summary();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "treasure");
        assert_eq!(json["minBet"], 500);
        assert_eq!(json["maxBet"], 50_000);
    }

    #[test]
    fn test_missing_entry_is_internal() {
        let catalog = GameCatalog::new(Vec::new());
        let err = catalog.get_config(GameType::Dice).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}

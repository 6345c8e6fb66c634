//! Progressive jackpot pools
//!
//! One pool per jackpot-eligible game, each behind its own mutex so that a
//! contribution and a claim on the same pool never interleave.

use crate::config::JackpotConfig;
use crate::errors::{GameError, GameResult};
use crate::games::types::GameType;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JackpotPool {
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub amount: u64,
    pub floor: u64,
    pub last_winner: Option<String>,
    pub last_won_at: Option<DateTime<Utc>>,
}

impl JackpotPool {
    fn new(game_type: GameType, floor: u64) -> Self {
        Self {
            game_type,
            amount: floor,
            floor,
            last_winner: None,
            last_won_at: None,
        }
    }
}

pub struct JackpotAccumulator {
    pools: HashMap<GameType, Mutex<JackpotPool>>,
    contribution_percent: u64,
}

impl JackpotAccumulator {
    pub fn new(config: &JackpotConfig) -> Self {
        let pools = GameType::ALL
            .iter()
            .filter(|game| game.is_jackpot_eligible())
            .map(|&game| (game, Mutex::new(JackpotPool::new(game, config.floor))))
            .collect();

        Self {
            pools,
            contribution_percent: config.contribution_percent,
        }
    }

    fn pool(&self, game_type: GameType) -> GameResult<MutexGuard<'_, JackpotPool>> {
        let pool = self
            .pools
            .get(&game_type)
            .ok_or(GameError::NoJackpot(game_type))?;
        pool.lock()
            .map_err(|_| GameError::Internal(format!("{} jackpot lock poisoned", game_type)))
    }

    /// Add `amount` to the pool; returns the new pool amount
    pub fn contribute(&self, game_type: GameType, amount: u64) -> GameResult<u64> {
        let mut pool = self.pool(game_type)?;
        pool.amount = pool.amount.saturating_add(amount);
        Ok(pool.amount)
    }

    /// Skim the configured percentage of a bet into the pool
    pub fn contribute_from_bet(&self, game_type: GameType, bet: u64) -> GameResult<u64> {
        let skim = bet.saturating_mul(self.contribution_percent) / 100;
        self.contribute(game_type, skim)
    }

    /// Pay out the whole pool and reset it to the floor.
    ///
    /// Read and reset happen under one lock, so of two concurrent claims only
    /// the first sees the accumulated amount.
    pub fn claim(&self, game_type: GameType, winner: &str) -> GameResult<u64> {
        let mut pool = self.pool(game_type)?;
        let payout = pool.amount;
        pool.amount = pool.floor;
        pool.last_winner = Some(winner.to_string());
        pool.last_won_at = Some(Utc::now());
        info!(game = %game_type, winner, payout, "jackpot claimed");
        Ok(payout)
    }

    pub fn snapshot(&self, game_type: GameType) -> GameResult<JackpotPool> {
        Ok(self.pool(game_type)?.clone())
    }

    pub fn snapshots(&self) -> GameResult<Vec<JackpotPool>> {
        let mut pools = self
            .pools
            .keys()
            .map(|&game| self.snapshot(game))
            .collect::<GameResult<Vec<_>>>()?;
        pools.sort_by_key(|pool| pool.game_type);
        Ok(pools)
    }
}

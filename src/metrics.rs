//! Prometheus metrics for the wagering engine

use crate::games::types::GameType;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

pub struct GameMetrics {
    registry: Registry,
    sessions_started: IntCounterVec,
    sessions_completed: IntCounterVec,
    coins_wagered: IntCounterVec,
    coins_paid: IntCounterVec,
    jackpot_pool: IntGaugeVec,
    settlement_failures: IntCounter,
}

impl GameMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("gamehall".to_string()), None)?;

        let sessions_started = IntCounterVec::new(
            Opts::new("sessions_started_total", "Sessions opened per game"),
            &["game"],
        )?;
        let sessions_completed = IntCounterVec::new(
            Opts::new("sessions_completed_total", "Sessions completed per game and outcome"),
            &["game", "outcome"],
        )?;
        let coins_wagered = IntCounterVec::new(
            Opts::new("coins_wagered_total", "Stakes reserved per game"),
            &["game"],
        )?;
        let coins_paid = IntCounterVec::new(
            Opts::new("coins_paid_total", "Settlements paid per game"),
            &["game"],
        )?;
        let jackpot_pool = IntGaugeVec::new(
            Opts::new("jackpot_pool_coins", "Current progressive jackpot pool"),
            &["game"],
        )?;
        let settlement_failures = IntCounter::new(
            "settlement_failures_total",
            "Credits that failed after a session completed",
        )?;

        registry.register(Box::new(sessions_started.clone()))?;
        registry.register(Box::new(sessions_completed.clone()))?;
        registry.register(Box::new(coins_wagered.clone()))?;
        registry.register(Box::new(coins_paid.clone()))?;
        registry.register(Box::new(jackpot_pool.clone()))?;
        registry.register(Box::new(settlement_failures.clone()))?;

        Ok(Self {
            registry,
            sessions_started,
            sessions_completed,
            coins_wagered,
            coins_paid,
            jackpot_pool,
            settlement_failures,
        })
    }

    pub fn record_start(&self, game: GameType, bet: u64) {
        self.sessions_started.with_label_values(&[game.as_str()]).inc();
        self.coins_wagered
            .with_label_values(&[game.as_str()])
            .inc_by(bet);
    }

    pub fn record_completion(&self, game: GameType, outcome: &str, payout: u64) {
        self.sessions_completed
            .with_label_values(&[game.as_str(), outcome])
            .inc();
        self.coins_paid
            .with_label_values(&[game.as_str()])
            .inc_by(payout);
    }

    pub fn record_settlement_failure(&self) {
        self.settlement_failures.inc();
    }

    pub fn set_jackpot(&self, game: GameType, amount: u64) {
        self.jackpot_pool
            .with_label_values(&[game.as_str()])
            .set(i64::try_from(amount).unwrap_or(i64::MAX));
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

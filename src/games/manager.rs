//! Session lifecycle manager
//!
//! Owns the session table and is the only component that mutates sessions.
//! Each session sits behind its own async mutex, so requests for different
//! sessions never wait on each other while two requests for the same session
//! are applied one after the other.

use crate::errors::{GameError, GameResult};
use crate::games::catalog::{GameCatalog, GameSummary};
use crate::games::engines::{EngineContext, EngineRegistry};
use crate::games::history::SessionHistory;
use crate::games::jackpot::{JackpotAccumulator, JackpotPool};
use crate::games::rng::RngProvider;
use crate::games::session::{GameSession, PayoutStatus, SessionSnapshot, SessionSummary};
use crate::games::settlement::SettlementGateway;
use crate::games::types::{
    FinalResult, GameType, PlayerAction, RoundDetail, SessionStatus, StateView, Step,
};
use crate::metrics::GameMetrics;
use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type SessionHandle = Arc<Mutex<GameSession>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOutcome {
    pub session_id: String,
    pub game_type: GameType,
    pub bet: u64,
    pub initial_state: StateView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub session_id: String,
    pub status: SessionStatus,
    pub cashout_eligible: bool,
    /// What this action revealed or resolved
    pub detail: RoundDetail,
    /// Present while the session is still active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_state: Option<StateView>,
    /// Present once the session has completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_result: Option<FinalResult>,
    pub payout_status: PayoutStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashoutOutcome {
    pub session_id: String,
    pub settlement_amount: u64,
    pub payout_status: PayoutStatus,
}

/// Counts from one reaper pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReapReport {
    pub cashed_out: usize,
    pub refunded: usize,
    /// Voided without a refund
    pub forfeited: usize,
    pub evicted: usize,
}

pub struct SessionManager {
    catalog: GameCatalog,
    engines: EngineRegistry,
    jackpot: Arc<JackpotAccumulator>,
    settlement: Arc<dyn SettlementGateway>,
    rng: Arc<dyn RngProvider>,
    sessions: DashMap<String, SessionHandle>,
    history: SessionHistory,
    metrics: Option<Arc<GameMetrics>>,
}

impl SessionManager {
    pub fn new(
        catalog: GameCatalog,
        jackpot: Arc<JackpotAccumulator>,
        settlement: Arc<dyn SettlementGateway>,
        rng: Arc<dyn RngProvider>,
        history_limit: usize,
    ) -> Self {
        let engines = EngineRegistry::from_catalog(&catalog);
        Self {
            catalog,
            engines,
            jackpot,
            settlement,
            rng,
            sessions: DashMap::new(),
            history: SessionHistory::new(history_limit),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<GameMetrics>) -> Self {
        for pool in self.jackpot.snapshots().unwrap_or_default() {
            metrics.set_jackpot(pool.game_type, pool.amount);
        }
        self.metrics = Some(metrics);
        self
    }

    pub fn list_games(&self) -> Vec<GameSummary> {
        self.catalog.list_games()
    }

    pub fn jackpots(&self) -> GameResult<Vec<JackpotPool>> {
        self.jackpot.snapshots()
    }

    pub fn jackpot(&self, game_type: GameType) -> GameResult<JackpotPool> {
        self.jackpot.snapshot(game_type)
    }

    pub async fn balance(&self, user_id: &str) -> GameResult<u64> {
        Ok(self.settlement.balance(user_id).await?)
    }

    pub fn history(
        &self,
        user_id: &str,
        game_type: GameType,
        offset: usize,
        limit: usize,
    ) -> Vec<SessionSummary> {
        self.history.page(user_id, game_type, offset, limit)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Open a session: validate the bet, build the initial state, reserve the stake
    pub async fn start(
        &self,
        user_id: &str,
        game_type: GameType,
        bet: u64,
        room_id: Option<String>,
    ) -> GameResult<StartOutcome> {
        self.catalog.validate_bet(game_type, bet)?;
        let engine = self.engines.get(game_type)?;
        let state = {
            let mut rng = self.rng.source();
            engine.initialize(bet, rng.as_mut())?
        };

        // No session exists unless the stake was taken
        self.settlement.reserve(user_id, bet).await?;

        let session = GameSession::new(user_id, game_type, bet, room_id, state);
        let outcome = StartOutcome {
            session_id: session.id.clone(),
            game_type,
            bet,
            initial_state: session.state.view(),
        };
        self.sessions
            .insert(session.id.clone(), Arc::new(Mutex::new(session)));

        if let Some(metrics) = &self.metrics {
            metrics.record_start(game_type, bet);
        }
        info!(
            session_id = %outcome.session_id,
            user_id,
            game = %game_type,
            bet,
            "session started"
        );
        Ok(outcome)
    }

    /// Apply one player action to an active session
    pub async fn action(
        &self,
        user_id: &str,
        game_type: GameType,
        session_id: &str,
        action: PlayerAction,
    ) -> GameResult<ActionOutcome> {
        let handle = self.handle(session_id)?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;
        Self::check_access(session, user_id, game_type)?;

        let engine = self.engines.get(session.game_type)?;
        let step = {
            let mut rng = self.rng.source();
            let mut ctx = EngineContext {
                session_id: &session.id,
                user_id: &session.user_id,
                bet: session.bet,
                rng: rng.as_mut(),
                jackpot: &self.jackpot,
            };
            engine.act(&mut session.state, &action, &mut ctx)?
        };
        session.touch();

        match step {
            Step::Continue {
                detail,
                cashout_eligible,
            } => {
                session.cashout_eligible = cashout_eligible;
                debug!(
                    session_id,
                    action = %action.action,
                    cashout_eligible,
                    "session advanced"
                );
                Ok(ActionOutcome {
                    session_id: session.id.clone(),
                    status: session.status,
                    cashout_eligible,
                    detail,
                    updated_state: Some(session.state.view()),
                    terminal_result: None,
                    payout_status: session.payout_status.clone(),
                })
            }
            Step::Resolved(result) => {
                let detail = result.detail.clone();
                self.finish(session, result.clone()).await;
                Ok(ActionOutcome {
                    session_id: session.id.clone(),
                    status: session.status,
                    cashout_eligible: false,
                    detail,
                    updated_state: None,
                    terminal_result: Some(result),
                    payout_status: session.payout_status.clone(),
                })
            }
        }
    }

    /// Bank the accrued value of a push-your-luck session
    pub async fn cashout(
        &self,
        user_id: &str,
        game_type: GameType,
        session_id: &str,
    ) -> GameResult<CashoutOutcome> {
        let handle = self.handle(session_id)?;
        let mut guard = handle.lock().await;
        let session = &mut *guard;
        Self::check_access(session, user_id, game_type)?;

        let engine = self.engines.get(session.game_type)?;
        let accrued = engine
            .accrued_payout(&session.state, session.bet)
            .ok_or_else(|| GameError::NotCashoutEligible(session.id.clone()))?;

        self.finish(
            session,
            FinalResult {
                won: true,
                payout: accrued,
                detail: RoundDetail::Cashout { accrued },
            },
        )
        .await;

        Ok(CashoutOutcome {
            session_id: session.id.clone(),
            settlement_amount: accrued,
            payout_status: session.payout_status.clone(),
        })
    }

    pub async fn session(&self, user_id: &str, session_id: &str) -> GameResult<SessionSnapshot> {
        let handle = self.handle(session_id)?;
        let session = handle.lock().await;
        session.ensure_owner(user_id)?;
        Ok(session.snapshot())
    }

    /// Expire active sessions idle longer than `ttl` and drop completed ones past it.
    ///
    /// Expired sessions with accrued value are cashed out. The rest are voided:
    /// refunded when the engine allows it, otherwise closed as a loss.
    pub async fn reap_abandoned(&self, ttl: Duration) -> ReapReport {
        let cutoff = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => Utc::now() - ttl,
            Err(_) => return ReapReport::default(),
        };
        // Collect handles first so no map shard lock is held across an await
        let handles: Vec<(String, SessionHandle)> = self
            .sessions
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut report = ReapReport::default();
        for (id, handle) in handles {
            let mut guard = handle.lock().await;
            let session = &mut *guard;

            if session.is_idle_since(cutoff) {
                let engine = match self.engines.get(session.game_type) {
                    Ok(engine) => engine,
                    Err(e) => {
                        warn!(session_id = %id, error = %e, "cannot expire session");
                        continue;
                    }
                };
                let result = match engine.accrued_payout(&session.state, session.bet) {
                    Some(accrued) => {
                        report.cashed_out += 1;
                        FinalResult {
                            won: true,
                            payout: accrued,
                            detail: RoundDetail::Cashout { accrued },
                        }
                    }
                    None if engine.refundable_on_expiry() => {
                        report.refunded += 1;
                        FinalResult {
                            won: false,
                            payout: session.bet,
                            detail: RoundDetail::Expired { refunded: true },
                        }
                    }
                    None => {
                        report.forfeited += 1;
                        FinalResult {
                            won: false,
                            payout: 0,
                            detail: RoundDetail::Expired { refunded: false },
                        }
                    }
                };
                info!(session_id = %id, payout = result.payout, "abandoned session expired");
                self.finish(session, result).await;
            } else if session
                .completed_at
                .map(|done| done <= cutoff)
                .unwrap_or(false)
            {
                drop(guard);
                self.sessions.remove(&id);
                report.evicted += 1;
            }
        }

        if report != ReapReport::default() {
            info!(
                cashed_out = report.cashed_out,
                refunded = report.refunded,
                forfeited = report.forfeited,
                evicted = report.evicted,
                "reaper pass"
            );
        }
        report
    }

    fn handle(&self, session_id: &str) -> GameResult<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| GameError::SessionNotFound(session_id.to_string()))
    }

    fn check_access(session: &GameSession, user_id: &str, game_type: GameType) -> GameResult<()> {
        session.ensure_owner(user_id)?;
        session.ensure_game(game_type)?;
        session.ensure_active()
    }

    /// Complete the session, pay out, and record it.
    ///
    /// A failed credit never undoes the result; it is logged and recorded on the session.
    async fn finish(&self, session: &mut GameSession, result: FinalResult) {
        let payout = result.payout;
        if !session.complete(result) {
            return;
        }

        session.payout_status = if payout == 0 {
            PayoutStatus::NotApplicable
        } else {
            match self.settlement.credit(&session.user_id, payout).await {
                Ok(()) => PayoutStatus::Credited,
                Err(e) => {
                    warn!(
                        session_id = %session.id,
                        user_id = %session.user_id,
                        payout,
                        error = %e,
                        "settlement credit failed, result kept"
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_settlement_failure();
                    }
                    PayoutStatus::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        if let Some(summary) = session.summary() {
            if let Some(metrics) = &self.metrics {
                metrics.record_completion(session.game_type, &summary.outcome, payout);
                if session.game_type.is_jackpot_eligible() {
                    if let Ok(pool) = self.jackpot.snapshot(session.game_type) {
                        metrics.set_jackpot(pool.game_type, pool.amount);
                    }
                }
            }
            info!(
                session_id = %session.id,
                game = %session.game_type,
                outcome = %summary.outcome,
                payout,
                "session completed"
            );
            self.history.record(&session.user_id, summary);
        }
    }
}

//! Game session record and its state-machine guards

use crate::errors::{GameError, GameResult};
use crate::games::types::{FinalResult, GameState, GameType, RoundDetail, SessionStatus, StateView};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// What happened to the payout of a completed session
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoutStatus {
    /// Still active, or completed with nothing to pay
    NotApplicable,
    Credited,
    /// Credit call failed; the game result stands and needs out-of-band reconciliation
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: String,
    pub user_id: String,
    pub game_type: GameType,
    pub bet: u64,
    pub room_id: Option<String>,
    pub status: SessionStatus,
    pub state: GameState,
    pub cashout_eligible: bool,
    pub actions: u32,
    pub created_at: DateTime<Utc>,
    /// Last accepted player action; equals `created_at` until the first one
    pub last_action_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub final_result: Option<FinalResult>,
    pub settlement_amount: Option<u64>,
    pub payout_status: PayoutStatus,
}

impl GameSession {
    pub fn new(
        user_id: &str,
        game_type: GameType,
        bet: u64,
        room_id: Option<String>,
        state: GameState,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            game_type,
            bet,
            room_id,
            status: SessionStatus::Active,
            state,
            cashout_eligible: false,
            actions: 0,
            created_at: now,
            last_action_at: now,
            completed_at: None,
            final_result: None,
            settlement_amount: None,
            payout_status: PayoutStatus::NotApplicable,
        }
    }

    pub fn ensure_owner(&self, user_id: &str) -> GameResult<()> {
        if self.user_id != user_id {
            return Err(GameError::Forbidden(self.id.clone()));
        }
        Ok(())
    }

    pub fn ensure_game(&self, requested: GameType) -> GameResult<()> {
        if self.game_type != requested {
            return Err(GameError::GameTypeMismatch {
                session_id: self.id.clone(),
                requested,
                actual: self.game_type,
            });
        }
        Ok(())
    }

    pub fn ensure_active(&self) -> GameResult<()> {
        if self.status != SessionStatus::Active {
            return Err(GameError::SessionAlreadyCompleted(self.id.clone()));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn touch(&mut self) {
        self.actions += 1;
        self.last_action_at = Utc::now();
    }

    /// Active and untouched since `cutoff`
    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.is_active() && self.last_action_at <= cutoff
    }

    /// Freeze the session. Returns false if it was already completed.
    pub fn complete(&mut self, result: FinalResult) -> bool {
        if !self.is_active() {
            return false;
        }
        self.status = SessionStatus::Completed;
        self.cashout_eligible = false;
        self.completed_at = Some(Utc::now());
        self.settlement_amount = Some(result.payout);
        self.final_result = Some(result);
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            game_type: self.game_type,
            bet: self.bet,
            room_id: self.room_id.clone(),
            status: self.status,
            state: self.state.view(),
            cashout_eligible: self.cashout_eligible,
            final_result: self.final_result.clone(),
            payout_status: self.payout_status.clone(),
            created_at: self.created_at,
            last_action_at: self.last_action_at,
            completed_at: self.completed_at,
        }
    }

    /// History entry; `None` while the session is still active
    pub fn summary(&self) -> Option<SessionSummary> {
        let result = self.final_result.as_ref()?;
        let outcome = match &result.detail {
            RoundDetail::Cashout { .. } => "cashout",
            RoundDetail::Expired { .. } => "expired",
            _ if result.won => "won",
            _ => "lost",
        };
        Some(SessionSummary {
            session_id: self.id.clone(),
            game_type: self.game_type,
            bet: self.bet,
            payout: result.payout,
            won: result.won,
            outcome: outcome.to_string(),
            actions: self.actions,
            created_at: self.created_at,
            completed_at: self.completed_at.unwrap_or(self.created_at),
        })
    }
}

/// Client view of a session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub game_type: GameType,
    pub bet: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub status: SessionStatus,
    pub state: StateView,
    pub cashout_eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_result: Option<FinalResult>,
    pub payout_status: PayoutStatus,
    pub created_at: DateTime<Utc>,
    pub last_action_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub game_type: GameType,
    pub bet: u64,
    pub payout: u64,
    pub won: bool,
    pub outcome: String,
    pub actions: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

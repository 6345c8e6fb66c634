//! Bounded per-user history of completed sessions

use crate::games::session::SessionSummary;
use crate::games::types::GameType;
use dashmap::DashMap;
use std::collections::VecDeque;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

pub struct SessionHistory {
    entries: DashMap<String, VecDeque<SessionSummary>>,
    limit: usize,
}

impl SessionHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
        }
    }

    /// Record a completed session, dropping the user's oldest entry past the limit
    pub fn record(&self, user_id: &str, summary: SessionSummary) {
        let mut entries = self.entries.entry(user_id.to_string()).or_default();
        entries.push_front(summary);
        entries.truncate(self.limit);
    }

    /// Newest first, filtered to one game
    pub fn page(
        &self,
        user_id: &str,
        game_type: GameType,
        offset: usize,
        limit: usize,
    ) -> Vec<SessionSummary> {
        let Some(entries) = self.entries.get(user_id) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|summary| summary.game_type == game_type)
            .skip(offset)
            .take(limit.min(MAX_PAGE_SIZE))
            .cloned()
            .collect()
    }
}

//! Settlement gateway: wallet debit/credit at the edge of the engine
//!
//! The engine reserves the stake when a session starts and credits the payout
//! when it completes. Balances themselves belong to the gateway implementation.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettlementError {
    #[error("{user_id} cannot cover {requested} (balance {available})")]
    InsufficientFunds {
        user_id: String,
        requested: u64,
        available: u64,
    },

    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Two-phase wallet contract used by the session manager
#[async_trait]
pub trait SettlementGateway: Send + Sync {
    /// Debit the stake; fails without side effects when the balance is short
    async fn reserve(&self, user_id: &str, amount: u64) -> Result<(), SettlementError>;

    /// Pay out a settlement or refund a stake
    async fn credit(&self, user_id: &str, amount: u64) -> Result<(), SettlementError>;

    async fn balance(&self, user_id: &str) -> Result<u64, SettlementError>;
}

/// Process-local wallet; unknown users start with `opening_balance`
pub struct InMemoryWallet {
    balances: DashMap<String, u64>,
    opening_balance: u64,
}

impl InMemoryWallet {
    pub fn new(opening_balance: u64) -> Self {
        Self {
            balances: DashMap::new(),
            opening_balance,
        }
    }

    /// Overwrite a user's balance
    pub fn set_balance(&self, user_id: &str, amount: u64) {
        self.balances.insert(user_id.to_string(), amount);
    }
}

#[async_trait]
impl SettlementGateway for InMemoryWallet {
    async fn reserve(&self, user_id: &str, amount: u64) -> Result<(), SettlementError> {
        // The entry guard holds the shard lock, so check-and-debit is atomic per user
        let mut balance = self
            .balances
            .entry(user_id.to_string())
            .or_insert(self.opening_balance);
        if *balance < amount {
            return Err(SettlementError::InsufficientFunds {
                user_id: user_id.to_string(),
                requested: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        debug!(user_id, amount, remaining = *balance, "stake reserved");
        Ok(())
    }

    async fn credit(&self, user_id: &str, amount: u64) -> Result<(), SettlementError> {
        let mut balance = self
            .balances
            .entry(user_id.to_string())
            .or_insert(self.opening_balance);
        *balance = balance.saturating_add(amount);
        debug!(user_id, amount, balance = *balance, "credited");
        Ok(())
    }

    async fn balance(&self, user_id: &str) -> Result<u64, SettlementError> {
        Ok(self
            .balances
            .get(user_id)
            .map(|b| *b)
            .unwrap_or(self.opening_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reserve_and_credit() {
        let wallet = InMemoryWallet::new(1_000);
        wallet.reserve("alice", 400).await.unwrap();
        assert_eq!(wallet.balance("alice").await.unwrap(), 600);

        wallet.credit("alice", 1_000).await.unwrap();
        assert_eq!(wallet.balance("alice").await.unwrap(), 1_600);
    }

    #[tokio::test]
    async fn test_short_balance_is_untouched() {
        let wallet = InMemoryWallet::new(100);
        let err = wallet.reserve("bob", 500).await.unwrap_err();
        assert_eq!(
            err,
            SettlementError::InsufficientFunds {
                user_id: "bob".into(),
                requested: 500,
                available: 100,
            }
        );
        assert_eq!(wallet.balance("bob").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_unknown_user_sees_opening_balance() {
        let wallet = InMemoryWallet::new(42);
        assert_eq!(wallet.balance("nobody").await.unwrap(), 42);
        wallet.set_balance("nobody", 7);
        assert_eq!(wallet.balance("nobody").await.unwrap(), 7);
    }
}

//! In-memory ledger used by worker tests and local runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::client::CreditLedger;
use crate::error::LedgerResult;

/// Ledger backed by a process-local map. Balances may go negative, which
/// matches the HTTP service: only the pre-job balance check gates spending.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<String, i64>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a starting balance for a user.
    pub fn with_balance(user_id: &str, balance: i64) -> Self {
        let ledger = Self::new();
        ledger
            .balances
            .lock()
            .unwrap()
            .insert(user_id.to_string(), balance);
        ledger
    }
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, user_id: &str) -> LedgerResult<i64> {
        Ok(*self.balances.lock().unwrap().get(user_id).unwrap_or(&0))
    }

    async fn charge(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()> {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(user_id.to_string()).or_insert(0);
        *entry -= i64::from(amount);
        debug!("Charged {} from {} ({}), now {}", amount, user_id, reason, entry);
        Ok(())
    }

    async fn refund(&self, user_id: &str, amount: u32, reason: &str) -> LedgerResult<()> {
        let mut balances = self.balances.lock().unwrap();
        let entry = balances.entry(user_id.to_string()).or_insert(0);
        *entry += i64::from(amount);
        debug!("Refunded {} to {} ({}), now {}", amount, user_id, reason, entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_charge_and_refund() {
        let ledger = InMemoryLedger::with_balance("u1", 100);
        ledger.charge("u1", 30, "job").await.unwrap();
        assert_eq!(ledger.balance("u1").await.unwrap(), 70);
        ledger.refund("u1", 5, "captions unavailable").await.unwrap();
        assert_eq!(ledger.balance("u1").await.unwrap(), 75);
    }

    #[tokio::test]
    async fn test_charge_can_go_negative() {
        let ledger = InMemoryLedger::new();
        ledger.charge("u2", 10, "job").await.unwrap();
        assert_eq!(ledger.balance("u2").await.unwrap(), -10);
    }
}

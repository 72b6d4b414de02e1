use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use transit_core::{Settlement, TransitError, TransitResult, WalletLedger};
use transit_shared::models::{
    TransactionKind, TransactionStatus, WalletAccount, WalletTransaction,
};

#[derive(Default)]
struct WalletState {
    accounts: HashMap<Uuid, WalletAccount>,
    transactions: Vec<WalletTransaction>,
}

/// In-memory wallet ledger. A settlement mutates its pending buckets and
/// records the audit rows under a single lock, so both legs land together.
#[derive(Default)]
pub struct MemWalletLedger {
    inner: Mutex<WalletState>,
}

enum Bucket {
    ToPay,
    ToReceive,
}

impl MemWalletLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn account(&self, user_id: Uuid) -> Option<WalletAccount> {
        self.inner.lock().await.accounts.get(&user_id).cloned()
    }

    pub async fn transactions_for(&self, user_id: Uuid) -> Vec<WalletTransaction> {
        self.inner
            .lock()
            .await
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }

    fn apply(
        state: &mut WalletState,
        user_id: Uuid,
        amount: f64,
        memo: &str,
        bucket: Bucket,
    ) -> WalletTransaction {
        let account = state
            .accounts
            .entry(user_id)
            .or_insert_with(|| WalletAccount::new(user_id));

        // Credits touch the pending buckets only; the settled balance is
        // unchanged, so before == after on the audit row.
        let balance_before = account.balance;
        match bucket {
            Bucket::ToPay => account.to_pay += amount,
            Bucket::ToReceive => account.to_receive += amount,
        }
        let transaction = WalletTransaction {
            id: Uuid::new_v4(),
            wallet_id: account.id,
            user_id,
            amount,
            balance_before,
            balance_after: account.balance,
            kind: TransactionKind::Add,
            status: TransactionStatus::Success,
            remarks: memo.to_string(),
            created_at: Utc::now(),
        };
        state.transactions.push(transaction.clone());
        tracing::info!(user = %user_id, amount, memo, "wallet credit recorded");
        transaction
    }
}

#[async_trait]
impl WalletLedger for MemWalletLedger {
    async fn credit_settlement(
        &self,
        settlement: Settlement,
    ) -> TransitResult<Vec<WalletTransaction>> {
        if settlement.amount <= 0.0 {
            return Err(TransitError::Validation(format!(
                "credit amount must be positive, got {}",
                settlement.amount
            )));
        }

        // One lock span covers every leg; a settlement cannot half-commit.
        let mut state = self.inner.lock().await;
        let mut rows = Vec::new();
        if let Some((user_id, memo)) = &settlement.to_pay {
            rows.push(Self::apply(
                &mut state,
                *user_id,
                settlement.amount,
                memo,
                Bucket::ToPay,
            ));
        }
        if let Some((user_id, memo)) = &settlement.to_receive {
            rows.push(Self::apply(
                &mut state,
                *user_id,
                settlement.amount,
                memo,
                Bucket::ToReceive,
            ));
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settlement_credits_both_legs_and_audit_rows() {
        let ledger = MemWalletLedger::new();
        let passenger = Uuid::new_v4();
        let driver = Uuid::new_v4();

        let rows = ledger
            .credit_settlement(Settlement {
                amount: 120.50,
                to_pay: Some((passenger, "Trip amount - seat booking 1".to_string())),
                to_receive: Some((driver, "Trip amount (driver) - seat booking 1".to_string())),
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let pax = ledger.account(passenger).await.unwrap();
        assert_eq!(pax.to_pay, 120.50);
        assert_eq!(pax.to_receive, 0.0);
        assert_eq!(pax.balance, 0.0);

        let drv = ledger.account(driver).await.unwrap();
        assert_eq!(drv.to_receive, 120.50);

        let rows = ledger.transactions_for(passenger).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, TransactionKind::Add);
        assert_eq!(rows[0].status, TransactionStatus::Success);
        assert_eq!(rows[0].balance_before, rows[0].balance_after);
    }

    #[tokio::test]
    async fn test_single_leg_settlement_touches_one_account() {
        let ledger = MemWalletLedger::new();
        let driver = Uuid::new_v4();

        let rows = ledger
            .credit_settlement(Settlement {
                amount: 74.26,
                to_pay: None,
                to_receive: Some((driver, "Trip amount (driver) - seat booking 2".to_string())),
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(ledger.account(driver).await.unwrap().to_receive, 74.26);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount() {
        let ledger = MemWalletLedger::new();
        let user = Uuid::new_v4();
        let err = ledger
            .credit_settlement(Settlement {
                amount: 0.0,
                to_pay: Some((user, "noop".to_string())),
                to_receive: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransitError::Validation(_)));
        assert!(ledger.account(user).await.is_none());
    }
}

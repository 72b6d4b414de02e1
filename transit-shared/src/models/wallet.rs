use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Add,
    Deducted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

/// Per-user wallet balances. `to_pay`/`to_receive` accumulate fares owed by
/// passengers and owed to drivers; `balance` itself is settled elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: f64,
    pub to_pay: f64,
    pub to_receive: f64,
}

impl WalletAccount {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance: 0.0,
            to_pay: 0.0,
            to_receive: 0.0,
        }
    }
}

/// Audit row recorded for every wallet credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub remarks: String,
    pub created_at: DateTime<Utc>,
}

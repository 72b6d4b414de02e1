use async_trait::async_trait;
use uuid::Uuid;

use transit_shared::models::WalletTransaction;

use crate::TransitResult;

/// One fare settlement. A leg is `(user id, audit memo)`; either leg may be
/// absent when the passenger is a guest or the fare was settled at ticket
/// sale.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub amount: f64,
    /// Passenger leg, credited to `to_pay`.
    pub to_pay: Option<(Uuid, String)>,
    /// Driver leg, credited to `to_receive`.
    pub to_receive: Option<(Uuid, String)>,
}

/// Wallet collaborator. This core only credits the two pending buckets and
/// records the audit rows; wallet state itself is owned elsewhere.
#[async_trait]
pub trait WalletLedger: Send + Sync {
    /// Apply a settlement's legs all-or-nothing, one audit row per leg.
    /// Implementations must never commit one leg without the other.
    async fn credit_settlement(
        &self,
        settlement: Settlement,
    ) -> TransitResult<Vec<WalletTransaction>>;
}

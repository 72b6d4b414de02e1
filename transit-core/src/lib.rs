pub mod ledger;
pub mod repository;
pub mod rules;

pub use ledger::{Settlement, WalletLedger};
pub use rules::TransitRules;

/// Domain failure taxonomy. Everything an engine can reject with maps onto
/// one of these; the API layer recovers them into structured responses.
#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Trip end is blocked by seats that are still checked in.
    #[error("Seats still checked in: {}", .seats.join(", "))]
    PendingCheckout { seats: Vec<String> },

    /// A collaborator (wallet ledger) failed; the paired domain mutation
    /// was not committed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TransitResult<T> = Result<T, TransitError>;

pub mod currency;
pub mod domain;
pub mod settlement;
pub mod split;

pub use currency::{RateProvider, RateTable};
pub use domain::{Adjustment, AdjustmentKind, Debt, Event, Expense, Participant, SplitType};
pub use settlement::{settle, summarize, SettlementSummary};

/// Core result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Rate fetch failed: {0}")]
    RateFetch(String),
}

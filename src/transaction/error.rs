//! Transaction error types.

use super::id::TransactionId;
use thiserror::Error;

/// Errors raised by the transaction table.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransactionError {
    /// Commit or revert of an id that was never begun, or already settled.
    #[error("transaction {0} is not pending")]
    UnknownTransaction(TransactionId),

    /// Begin with an id that is already pending.
    #[error("transaction {0} is already pending")]
    DuplicateTransaction(TransactionId),
}

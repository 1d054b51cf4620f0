use thiserror::Error;

use crate::domain::{Cents, RequestError, TransactionId, format_cents};

#[derive(Error, Debug)]
pub enum AppError {
    /// A required field was missing or the amount was not positive
    #[error("Input error: {0}")]
    Validation(String),

    /// The amount could not be read as a number
    #[error("Invalid amount: {0}")]
    Format(String),

    #[error(
        "Insufficient funds in account {account_no}: balance {}, requested {}",
        format_cents(*balance),
        format_cents(*requested)
    )]
    InsufficientFunds {
        account_no: String,
        balance: Cents,
        requested: Cents,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<RequestError> for AppError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::InvalidAmount(e) => AppError::Format(e.to_string()),
            other => AppError::Validation(other.to_string()),
        }
    }
}

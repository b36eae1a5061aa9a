use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{AmountOverflow, Cents, CloseError, RegisterId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Register not found: {0}")]
    RegisterNotFound(String),

    #[error(
        "insufficient cash in register {register_id}: available {available} cents, requested {requested} cents"
    )]
    InsufficientFunds {
        register_id: RegisterId,
        available: Cents,
        requested: Cents,
    },

    #[error("Register {0} is already closed")]
    RegisterAlreadyClosed(RegisterId),

    #[error("A register is already open for {0}")]
    RegisterAlreadyOpened(NaiveDate),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Register balance out of range")]
    AmountOverflow(#[from] AmountOverflow),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// The requested register does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::RegisterNotFound(_))
    }

    /// Rejected input, answered with a 400 by an HTTP front end.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            AppError::InsufficientFunds { .. }
                | AppError::RegisterAlreadyClosed(_)
                | AppError::InvalidAmount(_)
                | AppError::AmountOverflow(_)
        )
    }

    /// The operation clashes with an existing register (409).
    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::RegisterAlreadyOpened(_))
    }

    pub(crate) fn from_close(register_id: RegisterId, err: CloseError) -> Self {
        match err {
            CloseError::AlreadyClosed => AppError::RegisterAlreadyClosed(register_id),
            CloseError::NegativeWithdrawal(_) => {
                AppError::InvalidAmount("Withdrawal cannot be negative".to_string())
            }
            CloseError::InsufficientCash {
                available,
                requested,
            } => AppError::InsufficientFunds {
                register_id,
                available,
                requested,
            },
            CloseError::Overflow => AppError::AmountOverflow(AmountOverflow),
        }
    }
}

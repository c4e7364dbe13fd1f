// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::MonthKey;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Installment plan invalid: total={total}, already paid={paid}")]
    InvalidInstallments { total: u32, paid: u32 },
    #[error("Recurrence must span 2 to 60 months, got {0}")]
    InvalidRecurrence(u32),
    #[error("Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("Category '{0}' already exists")]
    DuplicateCategory(String),
    #[error("Category '{0}' not found")]
    UnknownCategory(String),
    #[error("At least one category must remain")]
    LastCategory,
    #[error("Savings goal {goal} holds {current}, cannot withdraw {requested}")]
    InsufficientBalance {
        goal: Uuid,
        current: Decimal,
        requested: Decimal,
    },
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Savings goal not found: {0}")]
    GoalNotFound(Uuid),
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),
    #[error("No data found for previous month {0}")]
    NoPreviousMonth(MonthKey),
    #[error("Expansion stopped at {failed_month} after {completed} write(s): {source}")]
    PartialExpansion {
        completed: usize,
        failed_month: MonthKey,
        #[source]
        source: Box<Error>,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Financial analysis failed: {0}")]
    Advisor(String),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors raised before anything was written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidInstallments { .. }
                | Error::InvalidRecurrence(_)
                | Error::NonPositiveAmount(_)
                | Error::DuplicateCategory(_)
                | Error::UnknownCategory(_)
                | Error::LastCategory
                | Error::InsufficientBalance { .. }
        )
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Store-independent ledger logic: turning one submission into month writes,
//! and reading month documents back into summaries.

pub mod expansion;
pub mod summary;

pub use expansion::{PlannedWrite, expand, installment_amount};
pub use summary::{
    AnnualSummary, MonthSummary, compute_annual_summary, compute_month_summary, progress,
};

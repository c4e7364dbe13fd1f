// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{MonthBucket, MonthKey, Transaction};

pub const UNCATEGORIZED: &str = "Sem categoria";

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub opening_balance: Decimal,
    pub total_income_planned: Decimal,
    pub total_income_actual: Decimal,
    pub total_expense_planned: Decimal,
    pub total_expense_actual: Decimal,
    pub final_cash_actual: Decimal,
    pub final_cash_planned: Decimal,
    /// Realized share of planned income, in percent. Not clamped.
    pub income_progress: Decimal,
    /// Realized share of planned expenses, in percent. Not clamped.
    pub expense_progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub biggest_income: Option<Transaction>,
    pub biggest_expense: Option<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    pub month: MonthKey,
    pub label: &'static str,
    pub income: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub rows: Vec<AnnualRow>,
    pub total_income: Decimal,
}

/// Sums amounts, saturating at the `Decimal` bounds instead of overflowing.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn sum_planned(list: &[Transaction]) -> Decimal {
    saturating_sum(list.iter().map(|t| t.planned))
}

fn sum_actual(list: &[Transaction]) -> Decimal {
    saturating_sum(list.iter().map(|t| t.actual))
}

/// `actual / planned * 100`, or zero when nothing was planned.
/// Ratios too large to represent saturate at `Decimal::MAX`.
pub fn progress(actual: Decimal, planned: Decimal) -> Decimal {
    if planned > Decimal::ZERO {
        actual
            .checked_div(planned)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::MAX)
    } else {
        Decimal::ZERO
    }
}

/// Caps a progress value for display bars.
pub fn clamp_progress(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

pub fn compute_month_summary(bucket: &MonthBucket) -> MonthSummary {
    let total_income_planned = sum_planned(&bucket.income);
    let total_income_actual = sum_actual(&bucket.income);
    let total_expense_planned = sum_planned(&bucket.expenses);
    let total_expense_actual = sum_actual(&bucket.expenses);
    let opening = bucket.opening_balance;

    MonthSummary {
        opening_balance: opening,
        total_income_planned,
        total_income_actual,
        total_expense_planned,
        total_expense_actual,
        final_cash_actual: opening
            .saturating_add(total_income_actual)
            .saturating_sub(total_expense_actual),
        final_cash_planned: opening
            .saturating_add(total_income_planned)
            .saturating_sub(total_expense_planned),
        income_progress: progress(total_income_actual, total_income_planned),
        expense_progress: progress(total_expense_actual, total_expense_planned),
    }
}

/// Entry with the largest realized amount; the earliest one wins a tie.
pub fn biggest(list: &[Transaction]) -> Option<&Transaction> {
    list.iter().fold(None, |best, t| match best {
        Some(b) if b.actual >= t.actual => Some(b),
        _ => Some(t),
    })
}

pub fn insights(bucket: &MonthBucket) -> Insights {
    let surfaced = |list: &[Transaction]| {
        biggest(list)
            .filter(|t| t.actual > Decimal::ZERO)
            .cloned()
    };
    Insights {
        biggest_income: surfaced(&bucket.income),
        biggest_expense: surfaced(&bucket.expenses),
    }
}

/// Unconfirmed first, newest first inside each group.
pub fn sorted_for_display(list: &[Transaction]) -> Vec<Transaction> {
    let mut out = list.to_vec();
    out.sort_by(|a, b| a.confirmed.cmp(&b.confirmed).then_with(|| b.date.cmp(&a.date)));
    out
}

pub fn expenses_by_category(bucket: &MonthBucket) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for t in bucket.expenses.iter().filter(|t| t.actual > Decimal::ZERO) {
        let name = t
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        match totals.iter_mut().find(|c| c.category == name) {
            Some(entry) => entry.total = entry.total.saturating_add(t.actual),
            None => totals.push(CategoryTotal {
                category: name.to_string(),
                total: t.actual,
            }),
        }
    }
    for entry in &mut totals {
        entry.total = entry.total.round_dp(2);
    }
    totals
}

/// Twelve rows for `year`; months without a bucket come out as zeros.
/// Buckets belonging to other years are ignored.
pub fn compute_annual_summary(
    year: i32,
    buckets: &BTreeMap<MonthKey, MonthBucket>,
) -> AnnualSummary {
    let rows: Vec<AnnualRow> = MonthKey::months_of(year)
        .zip(MONTH_LABELS)
        .map(|(month, label)| {
            let (income, expenses) = buckets
                .get(&month)
                .map(|b| (sum_actual(&b.income), sum_actual(&b.expenses)))
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            AnnualRow {
                month,
                label,
                income,
                expenses,
            }
        })
        .collect();
    let total_income = saturating_sum(rows.iter().map(|r| r.income));
    AnnualSummary {
        year,
        rows,
        total_income,
    }
}

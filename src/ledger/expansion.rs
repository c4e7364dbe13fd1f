// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    InstallmentInfo, InstallmentPlan, MonthKey, Schedule, Transaction, TransactionDraft,
    TransactionKind,
};

pub const MIN_RECURRENCE_MONTHS: u32 = 2;
pub const MAX_RECURRENCE_MONTHS: u32 = 60;

/// One record to append to one month list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedWrite {
    pub month: MonthKey,
    pub kind: TransactionKind,
    pub record: Transaction,
}

/// Expands a draft into the writes it implies, in month order.
///
/// Nothing here touches storage; the caller applies the writes. Validation
/// that only depends on the draft itself happens here, so an invalid draft
/// never produces a partial write.
pub fn expand(
    kind: TransactionKind,
    draft: &TransactionDraft,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedWrite>> {
    validate_draft(kind, draft)?;
    match draft.schedule {
        Schedule::Single => Ok(vec![PlannedWrite {
            month: MonthKey::from_date(draft.date),
            kind,
            record: seed_record(draft, now),
        }]),
        Schedule::Recurring { months } => expand_recurring(kind, draft, months, now),
        Schedule::Installments(plan) => expand_installments(kind, draft, plan, now),
    }
}

/// Planned value of each installment: an even split rounded to cents.
///
/// The remainder is not redistributed, so the installments may add up to a
/// few cents more or less than the purchase.
pub fn installment_amount(planned: Decimal, total: u32) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    (planned / Decimal::from(total)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn validate_draft(kind: TransactionKind, draft: &TransactionDraft) -> Result<()> {
    if draft.description.trim().is_empty() {
        return Err(Error::Validation("Description is required".into()));
    }
    if draft.planned.is_sign_negative() || draft.actual.is_sign_negative() {
        return Err(Error::Validation(format!(
            "Amounts cannot be negative (planned {}, actual {})",
            draft.planned, draft.actual
        )));
    }
    match kind {
        TransactionKind::Expense => {
            if draft.category.as_deref().is_none_or(|c| c.trim().is_empty()) {
                return Err(Error::Validation("Expenses require a category".into()));
            }
        }
        TransactionKind::Income => {
            if draft.client_id.is_none() {
                return Err(Error::Validation("Income requires a client".into()));
            }
            if matches!(draft.schedule, Schedule::Installments(_)) {
                return Err(Error::Validation(
                    "Only expenses can be split into installments".into(),
                ));
            }
        }
    }
    Ok(())
}

fn seed_record(draft: &TransactionDraft, now: DateTime<Utc>) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        description: draft.description.trim().to_string(),
        date: draft.date,
        planned: draft.planned,
        actual: draft.actual,
        confirmed: draft.confirmed,
        category: draft.category.as_ref().map(|c| c.trim().to_string()),
        client_id: draft.client_id,
        client_name: draft.client_name.clone(),
        is_recurring: false,
        recurring_months: None,
        recurrence_id: None,
        is_installment: false,
        installment_plan: None,
        installment: None,
        installment_id: None,
        created_at: Some(now),
        updated_at: None,
    }
}

fn shift_date(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| Error::Validation(format!("Date {} + {} months is out of range", date, months)))
}

fn expand_installments(
    kind: TransactionKind,
    draft: &TransactionDraft,
    plan: InstallmentPlan,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedWrite>> {
    if plan.total == 0 || plan.paid >= plan.total {
        return Err(Error::InvalidInstallments {
            total: plan.total,
            paid: plan.paid,
        });
    }
    let amount = installment_amount(draft.planned, plan.total);
    let series = Uuid::new_v4();
    let seed_month = MonthKey::from_date(draft.date);
    let base = seed_record(draft, now);

    (0..plan.total - plan.paid)
        .map(|i| {
            let index = plan.paid + i + 1;
            let record = Transaction {
                id: Uuid::new_v4(),
                description: format!("{} ({}/{})", base.description, index, plan.total),
                date: shift_date(draft.date, i)?,
                planned: amount,
                actual: Decimal::ZERO,
                confirmed: false,
                is_installment: true,
                installment: Some(InstallmentInfo {
                    current: index,
                    total: plan.total,
                }),
                installment_id: Some(series),
                ..base.clone()
            };
            Ok(PlannedWrite {
                month: seed_month.add_months(i),
                kind,
                record,
            })
        })
        .collect()
}

fn expand_recurring(
    kind: TransactionKind,
    draft: &TransactionDraft,
    months: u32,
    now: DateTime<Utc>,
) -> Result<Vec<PlannedWrite>> {
    if !(MIN_RECURRENCE_MONTHS..=MAX_RECURRENCE_MONTHS).contains(&months) {
        return Err(Error::InvalidRecurrence(months));
    }
    let seed_month = MonthKey::from_date(draft.date);
    let first = Transaction {
        is_recurring: true,
        recurring_months: Some(months),
        recurrence_id: Some(Uuid::new_v4()),
        ..seed_record(draft, now)
    };

    let mut writes = Vec::with_capacity(months as usize);
    for i in 1..months {
        writes.push(PlannedWrite {
            month: seed_month.add_months(i),
            kind,
            record: Transaction {
                id: Uuid::new_v4(),
                date: shift_date(draft.date, i)?,
                confirmed: false,
                actual: Decimal::ZERO,
                ..first.clone()
            },
        });
    }
    writes.insert(
        0,
        PlannedWrite {
            month: seed_month,
            kind,
            record: first,
        },
    );
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn expense(desc: &str, on: &str, planned: Decimal) -> TransactionDraft {
        TransactionDraft::new(desc, date(on), planned).category("Equipamento")
    }

    #[test]
    fn installment_example_from_january() {
        let draft = expense("Notebook", "2024-01-15", dec!(1200)).installments(12, 2);
        let writes = expand(TransactionKind::Expense, &draft, Utc::now()).unwrap();

        assert_eq!(writes.len(), 10);
        let months: Vec<String> = writes.iter().map(|w| w.month.to_string()).collect();
        assert_eq!(months.first().map(String::as_str), Some("2024-01"));
        assert_eq!(months.last().map(String::as_str), Some("2024-10"));
        for (i, w) in writes.iter().enumerate() {
            let index = i as u32 + 3;
            assert_eq!(w.record.planned, dec!(100));
            assert_eq!(w.record.actual, Decimal::ZERO);
            assert!(!w.record.confirmed);
            assert!(w.record.is_installment);
            assert_eq!(
                w.record.installment,
                Some(InstallmentInfo {
                    current: index,
                    total: 12
                })
            );
            assert_eq!(w.record.description, format!("Notebook ({}/12)", index));
            assert_eq!(MonthKey::from_date(w.record.date), w.month);
        }
        let series: HashSet<_> = writes.iter().map(|w| w.record.installment_id).collect();
        assert_eq!(series.len(), 1);
        assert!(series.iter().all(Option::is_some));
        let ids: HashSet<_> = writes.iter().map(|w| w.record.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn installment_counts_hold_for_every_plan() {
        for total in 1..=24u32 {
            for paid in 0..total {
                let draft = expense("Curso", "2024-05-02", dec!(999.99)).installments(total, paid);
                let writes = expand(TransactionKind::Expense, &draft, Utc::now()).unwrap();
                assert_eq!(writes.len() as u32, total - paid);
                let first = writes[0].record.installment.unwrap();
                let last = writes[writes.len() - 1].record.installment.unwrap();
                assert_eq!(first.current, paid + 1);
                assert_eq!(last.current, total);
                let exact = dec!(999.99) / Decimal::from(total);
                assert!((writes[0].record.planned - exact).abs() <= dec!(0.005));
            }
        }
    }

    #[test]
    fn installment_dates_clamp_to_month_end() {
        let draft = expense("Aluguel sala", "2024-01-31", dec!(300)).installments(3, 0);
        let writes = expand(TransactionKind::Expense, &draft, Utc::now()).unwrap();
        let dates: Vec<NaiveDate> = writes.iter().map(|w| w.record.date).collect();
        assert_eq!(dates, vec![date("2024-01-31"), date("2024-02-29"), date("2024-03-31")]);
    }

    #[test]
    fn installment_plan_rejections() {
        let zero = expense("X", "2024-01-01", dec!(10)).installments(0, 0);
        assert!(matches!(
            expand(TransactionKind::Expense, &zero, Utc::now()),
            Err(Error::InvalidInstallments { total: 0, .. })
        ));
        let all_paid = expense("X", "2024-01-01", dec!(10)).installments(3, 3);
        assert!(expand(TransactionKind::Expense, &all_paid, Utc::now()).is_err());

        let income = TransactionDraft::new("Projeto", date("2024-01-01"), dec!(10))
            .client(Uuid::new_v4())
            .installments(3, 0);
        let err = expand(TransactionKind::Income, &income, Utc::now()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn recurrence_spans_requested_months() {
        let client = Uuid::new_v4();
        let draft = TransactionDraft::new("Retainer", date("2024-11-10"), dec!(2500))
            .client(client)
            .confirmed_at(dec!(2500))
            .recurring(4);
        let writes = expand(TransactionKind::Income, &draft, Utc::now()).unwrap();

        let months: Vec<String> = writes.iter().map(|w| w.month.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert!(writes[0].record.confirmed);
        assert_eq!(writes[0].record.actual, dec!(2500));
        for w in &writes[1..] {
            assert!(!w.record.confirmed);
            assert_eq!(w.record.actual, Decimal::ZERO);
            assert_eq!(w.record.planned, dec!(2500));
            assert_eq!(w.record.client_id, Some(client));
        }
        let series: HashSet<_> = writes.iter().map(|w| w.record.recurrence_id).collect();
        assert_eq!(series.len(), 1);
        assert!(writes.iter().all(|w| w.record.is_recurring));
    }

    #[test]
    fn recurrence_bounds_are_enforced() {
        for months in [0, 1, 61, 120] {
            let draft = expense("Internet", "2024-01-05", dec!(99.9)).recurring(months);
            assert!(matches!(
                expand(TransactionKind::Expense, &draft, Utc::now()),
                Err(Error::InvalidRecurrence(m)) if m == months
            ));
        }
        for months in [2, 60] {
            let draft = expense("Internet", "2024-01-05", dec!(99.9)).recurring(months);
            let writes = expand(TransactionKind::Expense, &draft, Utc::now()).unwrap();
            assert_eq!(writes.len() as u32, months);
        }
    }

    #[test]
    fn single_draft_needs_kind_specific_fields() {
        let no_category = TransactionDraft::new("Café", date("2024-03-01"), dec!(8));
        assert!(expand(TransactionKind::Expense, &no_category, Utc::now()).is_err());

        let no_client = TransactionDraft::new("Freela", date("2024-03-01"), dec!(800));
        assert!(expand(TransactionKind::Income, &no_client, Utc::now()).is_err());

        let negative = expense("Estorno", "2024-03-01", dec!(-5));
        assert!(expand(TransactionKind::Expense, &negative, Utc::now()).is_err());

        let ok = expense("Café", "2024-03-01", dec!(8));
        let writes = expand(TransactionKind::Expense, &ok, Utc::now()).unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].month.to_string(), "2024-03");
        assert!(!writes[0].record.is_recurring && !writes[0].record.is_installment);
    }

    #[test]
    fn installment_amount_rounds_half_away_from_zero() {
        assert_eq!(installment_amount(dec!(100), 3), dec!(33.33));
        assert_eq!(installment_amount(dec!(0.05), 2), dec!(0.03));
        assert_eq!(installment_amount(dec!(10), 0), Decimal::ZERO);
    }
}

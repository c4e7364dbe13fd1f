// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::commands::{arg, profile, reports};
use crate::config;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::models::{MonthBucket, MonthKey, Transaction};
use crate::store::{DirectoryStore, MonthStore};
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_decimal, parse_month};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, user, sub)?,
        Some(("balance", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let value = parse_decimal(arg(sub, "amount")?)?;
            set_opening_balance(store, user, month, value)?;
            let ccy = config::currency(store)?;
            println!("Opening balance for {} set to {}", month, fmt_money(value, &ccy));
        }
        Some(("copy", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let bucket = copy_previous_month(store, user, month)?;
            println!(
                "Copied {} entradas and {} saidas from {} into {}",
                bucket.income.len(),
                bucket.expenses.len(),
                month.previous(),
                month
            );
        }
        _ => {}
    }
    Ok(())
}

fn show(store: &SqliteStore, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(sub, "month")?)?;
    open_month(store, user, month)?;
    let report = reports::month_report(store, user, month)?;
    if maybe_print_json(sub.get_flag("json"), &report)? {
        return Ok(());
    }

    let ccy = config::currency(store)?;
    let name = profile::greeting_name(store.get_profile(user)?.as_ref());
    let s = &report.summary;
    println!("Olá, {}! Resumo de {}", name, month);
    println!("  Saldo inicial:   {}", fmt_money(s.opening_balance, &ccy));
    println!(
        "  Entradas:        {} de {} ({})",
        fmt_money(s.total_income_actual, &ccy),
        fmt_money(s.total_income_planned, &ccy),
        fmt_percent(s.income_progress)
    );
    println!(
        "  Saídas:          {} de {} ({})",
        fmt_money(s.total_expense_actual, &ccy),
        fmt_money(s.total_expense_planned, &ccy),
        fmt_percent(s.expense_progress)
    );
    println!("  Saldo real:      {}", fmt_money(s.final_cash_actual, &ccy));
    println!("  Saldo previsto:  {}", fmt_money(s.final_cash_planned, &ccy));

    let describe = |t: &Option<Transaction>| match t {
        Some(t) => format!("{} ({})", t.description, fmt_money(t.actual, &ccy)),
        None => "-".to_string(),
    };
    println!("  Maior entrada:   {}", describe(&report.insights.biggest_income));
    println!("  Maior saída:     {}", describe(&report.insights.biggest_expense));
    Ok(())
}

/// Bucket for `month`, or an empty one when nothing is stored. Never writes.
pub fn load_month<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
) -> error::Result<MonthBucket> {
    Ok(store.get_month(user, month)?.unwrap_or_default())
}

/// Bucket for `month`, persisting an empty one on first access.
pub fn open_month<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
) -> error::Result<MonthBucket> {
    if let Some(bucket) = store.get_month(user, month)? {
        return Ok(bucket);
    }
    debug!(user, %month, "creating empty month");
    let bucket = MonthBucket::default();
    store.create_month(user, month, &bucket)?;
    Ok(bucket)
}

pub fn set_opening_balance<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
    value: Decimal,
) -> error::Result<()> {
    store.set_opening_balance(user, month, value)
}

/// Replaces the whole bucket of `current` with a copy of the previous month:
/// records come back unconfirmed with no actual value, the opening balance is
/// carried over as is. Ids, dates and series tags are kept.
pub fn copy_previous_month<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    current: MonthKey,
) -> error::Result<MonthBucket> {
    let previous = current.previous();
    let source = store
        .get_month(user, previous)?
        .ok_or(Error::NoPreviousMonth(previous))?;

    let reset = |list: &[Transaction]| -> Vec<Transaction> {
        list.iter()
            .map(|t| Transaction {
                confirmed: false,
                actual: Decimal::ZERO,
                ..t.clone()
            })
            .collect()
    };
    let bucket = MonthBucket {
        income: reset(&source.income),
        expenses: reset(&source.expenses),
        opening_balance: source.opening_balance,
    };
    store.put_month(user, current, &bucket)?;
    info!(
        user,
        from = %previous,
        to = %current,
        entradas = bucket.income.len(),
        saidas = bucket.expenses.len(),
        "month copied"
    );
    Ok(bucket)
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::commands::{arg, months};
use crate::config;
use crate::db::SqliteStore;
use crate::error;
use crate::ledger::summary::{
    AnnualSummary, CategoryTotal, Insights, MonthSummary, compute_annual_summary,
    compute_month_summary, expenses_by_category, insights,
};
use crate::models::MonthKey;
use crate::store::MonthStore;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_month, pretty_table};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let ccy = config::currency(store)?;
    match m.subcommand() {
        Some(("month", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let report = month_report(store, user, month)?;
            if !maybe_print_json(sub.get_flag("json"), &report)? {
                let s = &report.summary;
                let rows = vec![
                    vec!["Saldo inicial".into(), fmt_money(s.opening_balance, &ccy), String::new()],
                    vec![
                        "Entradas".into(),
                        fmt_money(s.total_income_actual, &ccy),
                        fmt_money(s.total_income_planned, &ccy),
                    ],
                    vec![
                        "Saídas".into(),
                        fmt_money(s.total_expense_actual, &ccy),
                        fmt_money(s.total_expense_planned, &ccy),
                    ],
                    vec![
                        "Saldo final".into(),
                        fmt_money(s.final_cash_actual, &ccy),
                        fmt_money(s.final_cash_planned, &ccy),
                    ],
                ];
                let header = month.to_string();
                println!("{}", pretty_table(&[header.as_str(), "Real", "Previsto"], rows));
                println!(
                    "Progress: entradas {}, saidas {}",
                    fmt_percent(s.income_progress),
                    fmt_percent(s.expense_progress)
                );
            }
        }
        Some(("annual", sub)) => {
            let year = *sub.get_one::<i32>("year").context("Missing --year")?;
            let report = annual_report(store, user, year)?;
            if !maybe_print_json(sub.get_flag("json"), &report)? {
                let mut rows: Vec<Vec<String>> = report
                    .rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.label.to_string(),
                            fmt_money(r.income, &ccy),
                            fmt_money(r.expenses, &ccy),
                        ]
                    })
                    .collect();
                rows.push(vec![
                    "Total".into(),
                    fmt_money(report.total_income, &ccy),
                    String::new(),
                ]);
                println!("{}", pretty_table(&["Mês", "Entradas", "Saídas"], rows));
            }
        }
        Some(("categories", sub)) => {
            let month = parse_month(arg(sub, "month")?)?;
            let data = category_breakdown(store, user, month)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|c| vec![c.category.clone(), fmt_money(c.total, &ccy)])
                    .collect();
                println!("{}", pretty_table(&["Categoria", "Total"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

/// Everything the month view shows, computed from one bucket read.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: MonthKey,
    pub summary: MonthSummary,
    pub insights: Insights,
    pub categories: Vec<CategoryTotal>,
}

pub fn month_report<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
) -> error::Result<MonthReport> {
    let bucket = months::load_month(store, user, month)?;
    Ok(MonthReport {
        month,
        summary: compute_month_summary(&bucket),
        insights: insights(&bucket),
        categories: expenses_by_category(&bucket),
    })
}

pub fn annual_report<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    year: i32,
) -> error::Result<AnnualSummary> {
    let buckets: BTreeMap<_, _> = store.list_months(user, year)?.into_iter().collect();
    Ok(compute_annual_summary(year, &buckets))
}

pub fn category_breakdown<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
) -> error::Result<Vec<CategoryTotal>> {
    let bucket = months::load_month(store, user, month)?;
    Ok(expenses_by_category(&bucket))
}

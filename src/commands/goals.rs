// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::commands::arg;
use crate::config;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::ledger::summary::{clamp_progress, progress};
use crate::models::SavingsGoal;
use crate::store::GoalStore;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_decimal, parse_id, pretty_table};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    let ccy = config::currency(store)?;
    match m.subcommand() {
        Some(("add", sub)) => {
            let target = parse_decimal(arg(sub, "target")?)?;
            let goal = create_goal(store, user, arg(sub, "name")?, target)?;
            println!(
                "Created cofrinho '{}' ({}) aiming at {}",
                goal.name,
                goal.id,
                fmt_money(goal.target, &ccy)
            );
        }
        Some(("deposit", sub)) => {
            let id = parse_id(arg(sub, "id")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let balance = deposit(store, user, id, amount)?;
            println!("Deposited {}, balance {}", fmt_money(amount, &ccy), fmt_money(balance, &ccy));
        }
        Some(("withdraw", sub)) => {
            let id = parse_id(arg(sub, "id")?)?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let balance = withdraw(store, user, id, amount)?;
            println!("Withdrew {}, balance {}", fmt_money(amount, &ccy), fmt_money(balance, &ccy));
        }
        Some(("rm", sub)) => {
            let id = parse_id(arg(sub, "id")?)?;
            delete_goal(store, user, id)?;
            println!("Deleted cofrinho {}", id);
        }
        Some(("list", sub)) => {
            let data = goal_status(store, user)?;
            if !maybe_print_json(sub.get_flag("json"), &data)? {
                let rows = data
                    .iter()
                    .map(|g| {
                        vec![
                            g.goal.id.to_string(),
                            g.goal.name.clone(),
                            fmt_money(g.goal.current, &ccy),
                            fmt_money(g.goal.target, &ccy),
                            fmt_percent(g.progress),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Cofrinho", "Saldo", "Meta", "Progresso"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalStatus {
    #[serde(flatten)]
    pub goal: SavingsGoal,
    /// Percent of the target reached, capped at 100.
    pub progress: Decimal,
}

pub fn create_goal<S: GoalStore + ?Sized>(
    store: &S,
    user: &str,
    name: &str,
    target: Decimal,
) -> error::Result<SavingsGoal> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Savings goal name cannot be empty".into()));
    }
    if target.is_sign_negative() {
        return Err(Error::Validation(format!("Target cannot be negative, got {}", target)));
    }
    let goal = SavingsGoal {
        id: Uuid::new_v4(),
        name: name.to_string(),
        current: Decimal::ZERO,
        target,
        created_at: Utc::now(),
    };
    store.create_goal(user, &goal)?;
    info!(user, goal = %goal.id, "savings goal created");
    Ok(goal)
}

pub fn goal_status<S: GoalStore + ?Sized>(store: &S, user: &str) -> error::Result<Vec<GoalStatus>> {
    Ok(store
        .list_goals(user)?
        .into_iter()
        .map(|goal| GoalStatus {
            progress: clamp_progress(progress(goal.current, goal.target)),
            goal,
        })
        .collect())
}

pub fn delete_goal<S: GoalStore + ?Sized>(store: &S, user: &str, id: Uuid) -> error::Result<()> {
    if !store.delete_goal(user, id)? {
        return Err(Error::GoalNotFound(id));
    }
    Ok(())
}

/// Adds money to a goal and returns the new balance.
pub fn deposit<S: GoalStore + ?Sized>(
    store: &S,
    user: &str,
    id: Uuid,
    amount: Decimal,
) -> error::Result<Decimal> {
    ensure_positive(amount)?;
    let balance = store.adjust_goal(user, id, amount)?;
    info!(user, goal = %id, %amount, "deposit");
    Ok(balance)
}

/// Takes money out of a goal; the balance never goes below zero.
pub fn withdraw<S: GoalStore + ?Sized>(
    store: &S,
    user: &str,
    id: Uuid,
    amount: Decimal,
) -> error::Result<Decimal> {
    ensure_positive(amount)?;
    let balance = store.adjust_goal(user, id, -amount)?;
    info!(user, goal = %id, %amount, "withdrawal");
    Ok(balance)
}

fn ensure_positive(amount: Decimal) -> error::Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount(amount));
    }
    Ok(())
}

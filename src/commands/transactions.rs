// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::commands::categories::resolve_category;
use crate::commands::clients::{display_client_name, resolve_client};
use crate::commands::{arg, months};
use crate::config;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::ledger::expansion::{PlannedWrite, expand};
use crate::ledger::summary::sorted_for_display;
use crate::models::{MonthKey, Transaction, TransactionDraft, TransactionKind};
use crate::store::{DirectoryStore, MonthStore};
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_id, parse_month, pretty_table,
};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, user, sub)?,
        Some(("list", sub)) => list(store, user, sub)?,
        Some(("edit", sub)) => edit(store, user, sub)?,
        Some(("confirm", sub)) => {
            let (month, kind, id) = locate(sub)?;
            let tx = toggle_confirmation(store, user, month, kind, id)?;
            let state = if tx.confirmed { "confirmed" } else { "pending" };
            println!("'{}' is now {}", tx.description, state);
        }
        Some(("rm", sub)) => {
            let (month, kind, id) = locate(sub)?;
            let tx = delete_transaction(store, user, month, kind, id)?;
            println!("Deleted '{}' from {}", tx.description, month);
        }
        _ => {}
    }
    Ok(())
}

fn locate(sub: &clap::ArgMatches) -> Result<(MonthKey, TransactionKind, Uuid)> {
    let month = parse_month(arg(sub, "month")?)?;
    let kind: TransactionKind = arg(sub, "type")?.parse()?;
    let id = parse_id(arg(sub, "id")?)?;
    Ok((month, kind, id))
}

fn add(store: &SqliteStore, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionKind = arg(sub, "type")?.parse()?;
    let date = parse_date(arg(sub, "date")?)?;
    let planned = parse_decimal(arg(sub, "planned")?)?;
    let mut draft = TransactionDraft::new(arg(sub, "desc")?, date, planned);

    if let Some(actual) = sub.get_one::<String>("actual") {
        draft.actual = parse_decimal(actual)?;
    }
    draft.confirmed = sub.get_flag("confirmed");
    if let Some(cat) = sub.get_one::<String>("category") {
        draft = draft.category(cat.as_str());
    }
    if let Some(key) = sub.get_one::<String>("client") {
        let client = resolve_client(store, user, key)?;
        draft = draft.client(client.id);
    }
    if let Some(n) = sub.get_one::<u32>("recurring") {
        draft = draft.recurring(*n);
    }
    if let Some(total) = sub.get_one::<u32>("installments") {
        let paid = sub.get_one::<u32>("paid").copied().unwrap_or(0);
        draft = draft.installments(*total, paid);
    }

    let writes = submit_transaction(store, user, kind, draft)
        .with_context(|| format!("Failed to record {}", kind.label().to_lowercase()))?;
    let ccy = config::currency(store)?;
    for w in &writes {
        println!(
            "Recorded {} '{}' {} in {}",
            kind.label(),
            w.record.description,
            fmt_money(w.record.planned, &ccy),
            w.month
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct Row {
    id: String,
    kind: &'static str,
    date: String,
    description: String,
    party: String,
    planned: String,
    actual: String,
    confirmed: bool,
}

fn list(store: &SqliteStore, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(arg(sub, "month")?)?;
    let only: Option<TransactionKind> = sub
        .get_one::<String>("type")
        .map(|t| t.parse())
        .transpose()?;
    let bucket = months::load_month(store, user, month)?;
    let clients = store.list_clients(user)?;

    let mut data = Vec::new();
    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        if only.is_some_and(|k| k != kind) {
            continue;
        }
        for tx in sorted_for_display(bucket.list(kind)) {
            let party = match kind {
                TransactionKind::Income => display_client_name(&clients, &tx),
                TransactionKind::Expense => tx.category.clone().unwrap_or_default(),
            };
            data.push(Row {
                id: tx.id.to_string(),
                kind: kind.label(),
                date: tx.date.to_string(),
                description: tx.description,
                party,
                planned: tx.planned.to_string(),
                actual: tx.actual.to_string(),
                confirmed: tx.confirmed,
            });
        }
    }

    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    r.kind.to_string(),
                    r.date.clone(),
                    r.description.clone(),
                    r.party.clone(),
                    r.planned.clone(),
                    r.actual.clone(),
                    if r.confirmed { "✔".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Type", "Date", "Description", "Client/Category", "Planned", "Actual", "Ok"],
                rows
            )
        );
    }
    Ok(())
}

fn edit(store: &SqliteStore, user: &str, sub: &clap::ArgMatches) -> Result<()> {
    let (month, kind, id) = locate(sub)?;
    let bucket = months::load_month(store, user, month)?;
    let mut tx = bucket
        .list(kind)
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or(Error::TransactionNotFound(id))?;

    if let Some(d) = sub.get_one::<String>("desc") {
        tx.description = d.trim().to_string();
    }
    if let Some(d) = sub.get_one::<String>("date") {
        tx.date = parse_date(d)?;
    }
    if let Some(v) = sub.get_one::<String>("planned") {
        tx.planned = parse_decimal(v)?;
    }
    if let Some(v) = sub.get_one::<String>("actual") {
        tx.actual = parse_decimal(v)?;
    }
    if let Some(c) = sub.get_one::<String>("category") {
        let cats = store.get_categories(user)?;
        let canonical =
            resolve_category(&cats, c).ok_or_else(|| Error::UnknownCategory(c.trim().to_string()))?;
        tx.category = Some(canonical);
    }

    let tx = update_transaction(store, user, month, kind, tx)?;
    println!("Updated '{}' in {}", tx.description, MonthKey::from_date(tx.date));
    Ok(())
}

/// Validates a draft against the user's reference data, expands it and
/// appends every resulting record in month order.
///
/// Expense categories are matched case-insensitively against the user's set
/// and stored with their canonical spelling. Income snapshots the client's
/// current name. When a write fails after at least one succeeded, the earlier
/// months stay written and `Error::PartialExpansion` reports how far it got.
pub fn submit_transaction<S>(
    store: &S,
    user: &str,
    kind: TransactionKind,
    mut draft: TransactionDraft,
) -> error::Result<Vec<PlannedWrite>>
where
    S: MonthStore + DirectoryStore + ?Sized,
{
    match kind {
        TransactionKind::Expense => {
            if let Some(name) = draft.category.as_deref().filter(|c| !c.trim().is_empty()) {
                let cats = store.get_categories(user)?;
                let canonical = resolve_category(&cats, name)
                    .ok_or_else(|| Error::UnknownCategory(name.trim().to_string()))?;
                draft.category = Some(canonical);
            }
        }
        TransactionKind::Income => {
            if let Some(id) = draft.client_id {
                let client = store.get_client(user, id)?.ok_or(Error::ClientNotFound(id))?;
                draft.client_name = Some(client.name);
            }
        }
    }

    let writes = expand(kind, &draft, Utc::now())?;
    apply_writes(store, user, &writes)?;
    info!(
        user,
        kind = kind.list_name(),
        records = writes.len(),
        "transaction recorded"
    );
    Ok(writes)
}

/// Appends planned writes one at a time. No rollback on failure.
pub fn apply_writes<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    writes: &[PlannedWrite],
) -> error::Result<()> {
    for (completed, w) in writes.iter().enumerate() {
        if let Err(e) = store.append_to_month(user, w.month, w.kind, &w.record) {
            if completed == 0 {
                return Err(e);
            }
            warn!(
                user,
                completed,
                failed_month = %w.month,
                error = %e,
                "expansion stopped part way"
            );
            return Err(Error::PartialExpansion {
                completed,
                failed_month: w.month,
                source: Box::new(e),
            });
        }
    }
    Ok(())
}

/// Replaces the record with the same id in the month list.
///
/// A record whose new date falls in another month is moved to that month's
/// bucket: appended there first, then removed from `month`.
pub fn update_transaction<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
    kind: TransactionKind,
    mut tx: Transaction,
) -> error::Result<Transaction> {
    if tx.description.trim().is_empty() {
        return Err(Error::Validation("Description is required".into()));
    }
    if tx.planned.is_sign_negative() || tx.actual.is_sign_negative() {
        return Err(Error::Validation("Amounts cannot be negative".into()));
    }
    let bucket = store.get_month(user, month)?.unwrap_or_default();
    let mut list = bucket.list(kind).to_vec();
    let pos = list
        .iter()
        .position(|t| t.id == tx.id)
        .ok_or(Error::TransactionNotFound(tx.id))?;
    tx.updated_at = Some(Utc::now());

    let target = MonthKey::from_date(tx.date);
    if target == month {
        list[pos] = tx.clone();
    } else {
        store.append_to_month(user, target, kind, &tx)?;
        list.remove(pos);
        info!(user, from = %month, to = %target, id = %tx.id, "transaction moved");
    }
    store.replace_month_list(user, month, kind, &list)?;
    Ok(tx)
}

pub fn delete_transaction<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
    kind: TransactionKind,
    id: Uuid,
) -> error::Result<Transaction> {
    let bucket = store.get_month(user, month)?.unwrap_or_default();
    let mut list = bucket.list(kind).to_vec();
    let pos = list
        .iter()
        .position(|t| t.id == id)
        .ok_or(Error::TransactionNotFound(id))?;
    let removed = list.remove(pos);
    store.replace_month_list(user, month, kind, &list)?;
    info!(user, %month, id = %id, "transaction deleted");
    Ok(removed)
}

/// Flips the confirmed flag. A record confirmed with no actual value takes
/// its planned value.
pub fn toggle_confirmation<S: MonthStore + ?Sized>(
    store: &S,
    user: &str,
    month: MonthKey,
    kind: TransactionKind,
    id: Uuid,
) -> error::Result<Transaction> {
    let bucket = store.get_month(user, month)?.unwrap_or_default();
    let mut list = bucket.list(kind).to_vec();
    let tx = list
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(Error::TransactionNotFound(id))?;
    tx.confirmed = !tx.confirmed;
    if tx.confirmed && tx.actual.is_zero() {
        tx.actual = tx.planned;
    }
    tx.updated_at = Some(Utc::now());
    let toggled = tx.clone();
    store.replace_month_list(user, month, kind, &list)?;
    Ok(toggled)
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing::info;

use crate::commands::arg;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::store::DirectoryStore;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            add_category(store, user, name)?;
            println!("Added category '{}'", name.trim());
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            remove_category(store, user, name)?;
            println!("Removed category '{}'", name.trim());
        }
        Some(("list", sub)) => {
            let cats = list_categories(store, user)?;
            if !maybe_print_json(sub.get_flag("json"), &cats)? {
                let rows = cats.into_iter().map(|c| vec![c]).collect();
                println!("{}", pretty_table(&["Category"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn list_categories<S: DirectoryStore + ?Sized>(store: &S, user: &str) -> error::Result<Vec<String>> {
    store.get_categories(user)
}

/// Canonical spelling of `name` in `categories`, compared case-insensitively.
pub fn resolve_category(categories: &[String], name: &str) -> Option<String> {
    let needle = name.trim().to_lowercase();
    categories
        .iter()
        .find(|c| c.to_lowercase() == needle)
        .cloned()
}

/// Appends a category label and returns the updated set.
pub fn add_category<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    name: &str,
) -> error::Result<Vec<String>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation("Category name cannot be empty".into()));
    }
    let mut cats = store.get_categories(user)?;
    if let Some(existing) = resolve_category(&cats, name) {
        return Err(Error::DuplicateCategory(existing));
    }
    cats.push(name.to_string());
    store.set_categories(user, &cats)?;
    info!(user, category = name, "category added");
    Ok(cats)
}

/// Removes a category label; the set never becomes empty.
pub fn remove_category<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    name: &str,
) -> error::Result<Vec<String>> {
    let mut cats = store.get_categories(user)?;
    let existing = resolve_category(&cats, name)
        .ok_or_else(|| Error::UnknownCategory(name.trim().to_string()))?;
    if cats.len() <= 1 {
        return Err(Error::LastCategory);
    }
    cats.retain(|c| *c != existing);
    store.set_categories(user, &cats)?;
    info!(user, category = %existing, "category removed");
    Ok(cats)
}

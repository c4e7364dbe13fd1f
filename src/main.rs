// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use caixafreela::{cli, commands, config, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cfg = config::Config::from_env();
    let matches = cli::build_cli().get_matches();

    let user = matches
        .get_one::<String>("user")
        .cloned()
        .unwrap_or_else(|| cfg.user.clone());
    let path = match &cfg.db_path {
        Some(p) => p.clone(),
        None => db::db_path()?,
    };
    let store = db::SqliteStore::open(&path)
        .with_context(|| format!("Failed to open database at {}", path.display()))?;

    match matches.subcommand() {
        Some(("init", sub)) => {
            if let Some(ccy) = sub.get_one::<String>("currency") {
                config::set_currency(&store, ccy)?;
            }
            println!("Database initialized at {}", path.display());
        }
        Some(("month", sub)) => commands::months::handle(&store, &user, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&store, &user, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, &user, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&store, &user, sub)?,
        Some(("category", sub)) => commands::categories::handle(&store, &user, sub)?,
        Some(("client", sub)) => commands::clients::handle(&store, &user, sub)?,
        Some(("profile", sub)) => commands::profile::handle(&store, &user, sub)?,
        Some(("analyze", sub)) => commands::analysis::handle(&store, &user, &cfg.ai, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::commands::arg;
use crate::db::SqliteStore;
use crate::error::{self, Error};
use crate::models::{Client, ClientInput, Transaction};
use crate::store::DirectoryStore;
use crate::utils::{maybe_print_json, parse_id, pretty_table};

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let client = add_client(store, user, input_from(sub)?)?;
            println!("Added client '{}' ({})", client.name, client.id);
        }
        Some(("edit", sub)) => {
            let id = parse_id(arg(sub, "id")?)?;
            let client = update_client(store, user, id, input_from(sub)?)?;
            println!("Updated client '{}'", client.name);
        }
        Some(("rm", sub)) => {
            let client = resolve_client(store, user, arg(sub, "client")?)?;
            delete_client(store, user, client.id)?;
            println!("Removed client '{}'", client.name);
        }
        Some(("list", sub)) => {
            let clients = list_clients(store, user)?;
            if !maybe_print_json(sub.get_flag("json"), &clients)? {
                let rows = clients
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.email.clone().unwrap_or_default(),
                            c.phone.clone().unwrap_or_default(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Name", "Email", "Phone"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn input_from(sub: &clap::ArgMatches) -> Result<ClientInput> {
    Ok(ClientInput {
        name: arg(sub, "name")?.to_string(),
        email: sub.get_one::<String>("email").cloned(),
        phone: sub.get_one::<String>("phone").cloned(),
    })
}

fn clean(input: ClientInput) -> error::Result<ClientInput> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation("Client name cannot be empty".into()));
    }
    let opt = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Ok(ClientInput {
        name,
        email: opt(input.email),
        phone: opt(input.phone),
    })
}

pub fn add_client<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    input: ClientInput,
) -> error::Result<Client> {
    let input = clean(input)?;
    let client = Client {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
        phone: input.phone,
        created_at: Utc::now(),
    };
    store.create_client(user, &client)?;
    info!(user, client = %client.id, "client added");
    Ok(client)
}

pub fn update_client<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    id: Uuid,
    input: ClientInput,
) -> error::Result<Client> {
    let input = clean(input)?;
    let existing = store.get_client(user, id)?.ok_or(Error::ClientNotFound(id))?;
    let client = Client {
        name: input.name,
        email: input.email,
        phone: input.phone,
        ..existing
    };
    if !store.update_client(user, &client)? {
        return Err(Error::ClientNotFound(id));
    }
    Ok(client)
}

/// Deletes the client record only. Income already recorded keeps its
/// `clienteNome` snapshot.
pub fn delete_client<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    id: Uuid,
) -> error::Result<()> {
    if !store.delete_client(user, id)? {
        return Err(Error::ClientNotFound(id));
    }
    info!(user, client = %id, "client deleted");
    Ok(())
}

/// Clients ordered by name.
pub fn list_clients<S: DirectoryStore + ?Sized>(store: &S, user: &str) -> error::Result<Vec<Client>> {
    let mut clients = store.list_clients(user)?;
    clients.sort_by_key(|c| c.name.to_lowercase());
    Ok(clients)
}

/// Looks a client up by id, falling back to a case-insensitive name match.
pub fn resolve_client<S: DirectoryStore + ?Sized>(
    store: &S,
    user: &str,
    key: &str,
) -> error::Result<Client> {
    if let Ok(id) = Uuid::parse_str(key.trim()) {
        return store.get_client(user, id)?.ok_or(Error::ClientNotFound(id));
    }
    let needle = key.trim().to_lowercase();
    store
        .list_clients(user)?
        .into_iter()
        .find(|c| c.name.to_lowercase() == needle)
        .ok_or_else(|| Error::Validation(format!("No client named '{}'", key.trim())))
}

/// Name to show for an income record: the live client when it still
/// exists, else the name captured at creation.
pub fn display_client_name(clients: &[Client], tx: &Transaction) -> String {
    tx.client_id
        .and_then(|id| clients.iter().find(|c| c.id == id))
        .map(|c| c.name.clone())
        .or_else(|| tx.client_name.clone())
        .unwrap_or_else(|| "-".to_string())
}

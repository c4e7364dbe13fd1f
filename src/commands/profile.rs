// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::db::SqliteStore;
use crate::error;
use crate::models::UserProfile;
use crate::store::DirectoryStore;
use crate::utils::maybe_print_json;

pub fn handle(store: &SqliteStore, user: &str, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let p = register(
                store,
                user,
                sub.get_one::<String>("name").map(String::as_str),
                sub.get_one::<String>("email").map(String::as_str),
            )?;
            println!("Profile saved for {}", greeting_name(Some(&p)));
        }
        Some(("show", sub)) => {
            let p = store.get_profile(user)?;
            if !maybe_print_json(sub.get_flag("json"), &p)? {
                match p {
                    Some(p) => {
                        println!("User:  {}", p.uid);
                        println!("Name:  {}", p.display_name.unwrap_or_default());
                        println!("Email: {}", p.email.unwrap_or_default());
                    }
                    None => println!("No profile for '{}'", user),
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Creates or updates the profile of `uid`. Fields left as `None` keep
/// their stored value.
pub fn register<S: DirectoryStore + ?Sized>(
    store: &S,
    uid: &str,
    display_name: Option<&str>,
    email: Option<&str>,
) -> error::Result<UserProfile> {
    let clean = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let profile = match store.get_profile(uid)? {
        Some(existing) => UserProfile {
            display_name: clean(display_name).or(existing.display_name),
            email: clean(email).or(existing.email),
            ..existing
        },
        None => UserProfile {
            uid: uid.to_string(),
            display_name: clean(display_name),
            email: clean(email),
            created_at: Utc::now(),
        },
    };
    store.put_profile(&profile)?;
    info!(user = uid, "profile saved");
    Ok(profile)
}

/// First word of the display name, capitalized. Falls back to the email's
/// local part, then to a generic greeting.
pub fn greeting_name(profile: Option<&UserProfile>) -> String {
    let source = profile.and_then(|p| {
        p.display_name
            .as_deref()
            .and_then(|n| n.split_whitespace().next())
            .or_else(|| p.email.as_deref().and_then(|e| e.split('@').next()))
            .filter(|s| !s.is_empty())
    });
    match source {
        Some(word) => {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        None => "Freelancer".to_string(),
    }
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use caixafreela::commands::{categories, clients, profile, transactions};
use caixafreela::db::SqliteStore;
use caixafreela::error::Error;
use caixafreela::models::{ClientInput, MonthKey, TransactionDraft, TransactionKind};
use caixafreela::store::{DirectoryStore, MonthStore};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

const USER: &str = "dani";

fn input(name: &str) -> ClientInput {
    ClientInput {
        name: name.into(),
        ..Default::default()
    }
}

#[test]
fn categories_reject_duplicates_and_last_removal() {
    let store = SqliteStore::open_in_memory().unwrap();
    categories::add_category(&store, USER, " Marketing ").unwrap();
    let cats = categories::add_category(&store, USER, "Software").unwrap();
    assert_eq!(cats, vec!["Marketing".to_string(), "Software".to_string()]);

    assert!(matches!(
        categories::add_category(&store, USER, "marketing"),
        Err(Error::DuplicateCategory(c)) if c == "Marketing"
    ));
    assert!(categories::add_category(&store, USER, "   ").is_err());
    assert!(matches!(
        categories::remove_category(&store, USER, "Aluguel"),
        Err(Error::UnknownCategory(_))
    ));

    let cats = categories::remove_category(&store, USER, "SOFTWARE").unwrap();
    assert_eq!(cats, vec!["Marketing".to_string()]);
    assert!(matches!(
        categories::remove_category(&store, USER, "Marketing"),
        Err(Error::LastCategory)
    ));
    assert_eq!(categories::list_categories(&store, USER).unwrap(), vec!["Marketing"]);
}

#[test]
fn clients_are_sorted_and_editable() {
    let store = SqliteStore::open_in_memory().unwrap();
    clients::add_client(&store, USER, input("zeta design")).unwrap();
    let alfa = clients::add_client(&store, USER, input("Alfa Tech")).unwrap();
    let names: Vec<_> = clients::list_clients(&store, USER)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Alfa Tech", "zeta design"]);

    let updated = clients::update_client(
        &store,
        USER,
        alfa.id,
        ClientInput {
            name: "Alfa Tecnologia".into(),
            email: Some("fin@alfa.com.br".into()),
            phone: Some(" ".into()),
        },
    )
    .unwrap();
    assert_eq!(updated.created_at, alfa.created_at);
    assert_eq!(updated.phone, None);
    assert_eq!(clients::resolve_client(&store, USER, "alfa tecnologia").unwrap().id, alfa.id);
    assert!(clients::add_client(&store, USER, input("")).is_err());
}

#[test]
fn deleting_a_client_keeps_recorded_income() {
    let store = SqliteStore::open_in_memory().unwrap();
    let client = clients::add_client(&store, USER, input("Beta SA")).unwrap();
    let draft = TransactionDraft::new(
        "Landing page",
        NaiveDate::from_ymd_opt(2024, 8, 12).unwrap(),
        dec!(1500),
    )
    .client(client.id);
    transactions::submit_transaction(&store, USER, TransactionKind::Income, draft).unwrap();

    clients::delete_client(&store, USER, client.id).unwrap();
    assert!(matches!(
        clients::delete_client(&store, USER, client.id),
        Err(Error::ClientNotFound(_))
    ));

    let aug: MonthKey = "2024-08".parse().unwrap();
    let bucket = store.get_month(USER, aug).unwrap().unwrap();
    assert_eq!(bucket.income.len(), 1);
    let remaining = store.list_clients(USER).unwrap();
    assert_eq!(clients::display_client_name(&remaining, &bucket.income[0]), "Beta SA");
}

#[test]
fn profile_updates_keep_unset_fields() {
    let store = SqliteStore::open_in_memory().unwrap();
    let first = profile::register(&store, USER, Some("daniela costa"), Some("dani@exemplo.com")).unwrap();
    let second = profile::register(&store, USER, None, Some("dani@novo.com")).unwrap();
    assert_eq!(second.display_name.as_deref(), Some("daniela costa"));
    assert_eq!(second.email.as_deref(), Some("dani@novo.com"));
    assert_eq!(second.created_at, first.created_at);
    let stored = store.get_profile(USER).unwrap();
    assert_eq!(profile::greeting_name(stored.as_ref()), "Daniela");
}

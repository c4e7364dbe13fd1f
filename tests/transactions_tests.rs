// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::Cell;

use caixafreela::commands::{categories, clients, transactions};
use caixafreela::db::SqliteStore;
use caixafreela::error::{Error, Result};
use caixafreela::models::{
    Client, ClientInput, MonthBucket, MonthKey, Transaction, TransactionDraft, TransactionKind,
    UserProfile,
};
use caixafreela::store::{DirectoryStore, MonthStore};
use caixafreela::cli;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

const USER: &str = "ana";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn month(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn setup() -> (SqliteStore, Client) {
    let store = SqliteStore::open_in_memory().unwrap();
    categories::add_category(&store, USER, "Software").unwrap();
    categories::add_category(&store, USER, "Equipamentos").unwrap();
    let client = clients::add_client(
        &store,
        USER,
        ClientInput {
            name: "Acme Ltda".into(),
            ..Default::default()
        },
    )
    .unwrap();
    (store, client)
}

fn expenses(store: &SqliteStore, m: &str) -> Vec<Transaction> {
    store
        .get_month(USER, month(m))
        .unwrap()
        .map(|b| b.expenses)
        .unwrap_or_default()
}

#[test]
fn installment_plan_lands_in_consecutive_months() {
    let (store, _) = setup();
    let draft = TransactionDraft::new("Notebook", date("2024-01-15"), dec!(1200))
        .category("equipamentos")
        .installments(12, 2);
    let writes = transactions::submit_transaction(&store, USER, TransactionKind::Expense, draft)
        .unwrap();
    assert_eq!(writes.len(), 10);

    let series = writes[0].record.installment_id;
    for (i, m) in MonthKey::months_of(2024).take(10).enumerate() {
        let list = expenses(&store, &m.to_string());
        assert_eq!(list.len(), 1, "month {}", m);
        let rec = &list[0];
        assert_eq!(rec.planned, dec!(100));
        assert_eq!(rec.installment.unwrap().current, i as u32 + 3);
        assert_eq!(rec.installment_id, series);
        assert_eq!(rec.category.as_deref(), Some("Equipamentos"));
        assert!(!rec.confirmed);
    }
    assert!(expenses(&store, "2024-11").is_empty());
    assert_eq!(expenses(&store, "2024-10")[0].description, "Notebook (12/12)");
}

#[test]
fn recurring_income_merges_into_existing_months() {
    let (store, client) = setup();
    let single = TransactionDraft::new("Consultoria", date("2024-02-10"), dec!(300)).client(client.id);
    transactions::submit_transaction(&store, USER, TransactionKind::Income, single).unwrap();

    let draft = TransactionDraft::new("Retainer", date("2024-01-05"), dec!(2000))
        .client(client.id)
        .confirmed_at(dec!(2000))
        .recurring(3);
    transactions::submit_transaction(&store, USER, TransactionKind::Income, draft).unwrap();

    let jan = store.get_month(USER, month("2024-01")).unwrap().unwrap();
    assert_eq!(jan.income.len(), 1);
    assert!(jan.income[0].confirmed);
    assert_eq!(jan.income[0].actual, dec!(2000));
    assert_eq!(jan.income[0].client_name.as_deref(), Some("Acme Ltda"));

    let feb = store.get_month(USER, month("2024-02")).unwrap().unwrap();
    assert_eq!(feb.income.len(), 2);
    assert_eq!(feb.income[0].description, "Consultoria");
    assert!(!feb.income[1].confirmed);
    assert_eq!(feb.income[1].actual, Decimal::ZERO);
    assert_eq!(feb.income[1].recurrence_id, jan.income[0].recurrence_id);

    let mar = store.get_month(USER, month("2024-03")).unwrap().unwrap();
    assert_eq!(mar.income.len(), 1);
    assert!(store.get_month(USER, month("2024-04")).unwrap().is_none());
}

#[test]
fn invalid_drafts_write_nothing() {
    let (store, client) = setup();
    let unknown_cat = TransactionDraft::new("Aluguel", date("2024-01-01"), dec!(900)).category("Moradia");
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Expense, unknown_cat)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownCategory(_)));

    let bad_plan = TransactionDraft::new("Monitor", date("2024-01-01"), dec!(900))
        .category("Equipamentos")
        .installments(3, 3);
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Expense, bad_plan)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInstallments { total: 3, paid: 3 }));

    let too_long = TransactionDraft::new("Retainer", date("2024-01-01"), dec!(10))
        .client(client.id)
        .recurring(61);
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Income, too_long)
        .unwrap_err();
    assert!(err.is_validation());

    let ghost = TransactionDraft::new("Job", date("2024-01-01"), dec!(10)).client(Uuid::new_v4());
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Income, ghost)
        .unwrap_err();
    assert!(matches!(err, Error::ClientNotFound(_)));

    assert!(store.list_months(USER, 2024).unwrap().is_empty());
}

/// Delegates to SQLite but refuses appends to one month.
struct FlakyStore {
    inner: SqliteStore,
    fail_at: MonthKey,
    attempts: Cell<usize>,
}

impl MonthStore for FlakyStore {
    fn get_month(&self, user: &str, month: MonthKey) -> Result<Option<MonthBucket>> {
        self.inner.get_month(user, month)
    }
    fn create_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()> {
        self.inner.create_month(user, month, bucket)
    }
    fn put_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()> {
        self.inner.put_month(user, month, bucket)
    }
    fn append_to_month(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        record: &Transaction,
    ) -> Result<()> {
        self.attempts.set(self.attempts.get() + 1);
        if month == self.fail_at {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.inner.append_to_month(user, month, kind, record)
    }
    fn replace_month_list(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        records: &[Transaction],
    ) -> Result<()> {
        self.inner.replace_month_list(user, month, kind, records)
    }
    fn set_opening_balance(&self, user: &str, month: MonthKey, value: Decimal) -> Result<()> {
        self.inner.set_opening_balance(user, month, value)
    }
    fn list_months(&self, user: &str, year: i32) -> Result<Vec<(MonthKey, MonthBucket)>> {
        self.inner.list_months(user, year)
    }
}

impl DirectoryStore for FlakyStore {
    fn get_categories(&self, user: &str) -> Result<Vec<String>> {
        self.inner.get_categories(user)
    }
    fn set_categories(&self, user: &str, categories: &[String]) -> Result<()> {
        self.inner.set_categories(user, categories)
    }
    fn create_client(&self, user: &str, client: &Client) -> Result<()> {
        self.inner.create_client(user, client)
    }
    fn get_client(&self, user: &str, id: Uuid) -> Result<Option<Client>> {
        self.inner.get_client(user, id)
    }
    fn list_clients(&self, user: &str) -> Result<Vec<Client>> {
        self.inner.list_clients(user)
    }
    fn update_client(&self, user: &str, client: &Client) -> Result<bool> {
        self.inner.update_client(user, client)
    }
    fn delete_client(&self, user: &str, id: Uuid) -> Result<bool> {
        self.inner.delete_client(user, id)
    }
    fn get_profile(&self, user: &str) -> Result<Option<UserProfile>> {
        self.inner.get_profile(user)
    }
    fn put_profile(&self, profile: &UserProfile) -> Result<()> {
        self.inner.put_profile(profile)
    }
}

#[test]
fn failed_write_keeps_earlier_months() {
    let (inner, _) = setup();
    let store = FlakyStore {
        inner,
        fail_at: month("2024-04"),
        attempts: Cell::new(0),
    };
    let draft = TransactionDraft::new("Notebook", date("2024-01-15"), dec!(1200))
        .category("Equipamentos")
        .installments(12, 2);
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Expense, draft)
        .unwrap_err();
    match err {
        Error::PartialExpansion {
            completed,
            failed_month,
            ..
        } => {
            assert_eq!(completed, 3);
            assert_eq!(failed_month, month("2024-04"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.attempts.get(), 4);
    for m in ["2024-01", "2024-02", "2024-03"] {
        assert_eq!(expenses(&store.inner, m).len(), 1, "month {}", m);
    }
    assert!(expenses(&store.inner, "2024-04").is_empty());
    assert!(expenses(&store.inner, "2024-05").is_empty());
}

#[test]
fn failure_on_first_write_is_not_partial() {
    let (inner, _) = setup();
    let store = FlakyStore {
        inner,
        fail_at: month("2024-01"),
        attempts: Cell::new(0),
    };
    let draft = TransactionDraft::new("Licença", date("2024-01-15"), dec!(50)).category("Software");
    let err = transactions::submit_transaction(&store, USER, TransactionKind::Expense, draft)
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn toggle_fills_actual_from_planned() {
    let (store, _) = setup();
    let draft = TransactionDraft::new("Hospedagem", date("2024-05-02"), dec!(49.90)).category("Software");
    let writes =
        transactions::submit_transaction(&store, USER, TransactionKind::Expense, draft).unwrap();
    let id = writes[0].record.id;
    let m = month("2024-05");

    let tx = transactions::toggle_confirmation(&store, USER, m, TransactionKind::Expense, id).unwrap();
    assert!(tx.confirmed);
    assert_eq!(tx.actual, dec!(49.90));

    let tx = transactions::toggle_confirmation(&store, USER, m, TransactionKind::Expense, id).unwrap();
    assert!(!tx.confirmed);
    assert_eq!(tx.actual, dec!(49.90));

    let err = transactions::toggle_confirmation(&store, USER, m, TransactionKind::Income, id)
        .unwrap_err();
    assert!(matches!(err, Error::TransactionNotFound(_)));
}

#[test]
fn update_and_delete_by_id() {
    let (store, _) = setup();
    let m = month("2024-06");
    for desc in ["Figma", "GitHub"] {
        let d = TransactionDraft::new(desc, date("2024-06-01"), dec!(20)).category("Software");
        transactions::submit_transaction(&store, USER, TransactionKind::Expense, d).unwrap();
    }
    let mut first = expenses(&store, "2024-06")[0].clone();
    first.actual = dec!(22.50);
    first.confirmed = true;
    let updated =
        transactions::update_transaction(&store, USER, m, TransactionKind::Expense, first.clone())
            .unwrap();
    assert!(updated.updated_at.is_some());
    let list = expenses(&store, "2024-06");
    assert_eq!(list[0].actual, dec!(22.50));
    assert_eq!(list[1].description, "GitHub");

    let removed =
        transactions::delete_transaction(&store, USER, m, TransactionKind::Expense, first.id).unwrap();
    assert_eq!(removed.description, "Figma");
    let list = expenses(&store, "2024-06");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].description, "GitHub");

    let err = transactions::delete_transaction(&store, USER, m, TransactionKind::Expense, first.id)
        .unwrap_err();
    assert!(matches!(err, Error::TransactionNotFound(_)));
}

#[test]
fn changing_the_date_moves_the_record_to_its_month() {
    let (store, _) = setup();
    let d = TransactionDraft::new("Adobe", date("2024-06-28"), dec!(120)).category("Software");
    transactions::submit_transaction(&store, USER, TransactionKind::Expense, d).unwrap();
    let mut tx = expenses(&store, "2024-06")[0].clone();
    tx.date = date("2024-07-03");

    let moved =
        transactions::update_transaction(&store, USER, month("2024-06"), TransactionKind::Expense, tx)
            .unwrap();
    assert!(expenses(&store, "2024-06").is_empty());
    let july = expenses(&store, "2024-07");
    assert_eq!(july.len(), 1);
    assert_eq!(july[0].id, moved.id);
    assert_eq!(july[0].date, date("2024-07-03"));

    // same-month edits stay in place
    let mut again = july[0].clone();
    again.date = date("2024-07-20");
    transactions::update_transaction(&store, USER, month("2024-07"), TransactionKind::Expense, again)
        .unwrap();
    let july = expenses(&store, "2024-07");
    assert_eq!(july.len(), 1);
    assert_eq!(july[0].date, date("2024-07-20"));
}

#[test]
fn cli_add_records_installments() {
    let (store, _) = setup();
    let matches = cli::build_cli()
        .try_get_matches_from([
            "caixafreela", "tx", "add", "--type", "saida", "--desc", "Cadeira", "--date",
            "2024-03-31", "--planned", "600", "--category", "Equipamentos", "--installments", "3",
        ])
        .unwrap();
    let (_, tx) = matches.subcommand().unwrap();
    transactions::handle(&store, USER, tx).unwrap();

    assert_eq!(expenses(&store, "2024-03").len(), 1);
    let apr = expenses(&store, "2024-04");
    assert_eq!(apr.len(), 1);
    assert_eq!(apr[0].date, date("2024-04-30"));
    assert_eq!(apr[0].planned, dec!(200));
    assert_eq!(expenses(&store, "2024-05").len(), 1);
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::types::Type;
use rusqlite::{
    Connection, OptionalExtension, Row, Transaction as SqlTransaction, TransactionBehavior, params,
};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{
    Client, MonthBucket, MonthKey, SavingsGoal, Transaction, TransactionKind, UserProfile,
};
use crate::store::{DirectoryStore, GoalStore, MonthStore};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("br.com.caixafreela", "CaixaFreela", "caixafreela"));

pub fn db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("caixafreela.sqlite"))
}

/// SQLite-backed implementation of every store trait.
///
/// Month lists are kept as JSON documents in one row per user and month,
/// amounts as decimal strings.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let v = self
            .conn
            .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn read_list(
        tx: &SqlTransaction<'_>,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
    ) -> Result<Option<Vec<Transaction>>> {
        let sql = format!(
            "SELECT {} FROM months WHERE user_id=?1 AND month=?2",
            kind.list_name()
        );
        let raw: Option<String> = tx
            .query_row(&sql, params![user, month.to_string()], |r| r.get(0))
            .optional()?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn write_list(
        tx: &SqlTransaction<'_>,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        records: &[Transaction],
    ) -> Result<()> {
        let col = kind.list_name();
        let sql = format!(
            "INSERT INTO months(user_id, month, {col}) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, month) DO UPDATE SET {col}=excluded.{col}, updated_at=datetime('now')"
        );
        tx.execute(
            &sql,
            params![user, month.to_string(), serde_json::to_string(records)?],
        )?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS users(
        uid TEXT PRIMARY KEY,
        display_name TEXT,
        email TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS months(
        user_id TEXT NOT NULL,
        month TEXT NOT NULL, -- YYYY-MM
        opening_balance TEXT NOT NULL DEFAULT '0',
        entradas TEXT NOT NULL DEFAULT '[]',
        saidas TEXT NOT NULL DEFAULT '[]',
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY(user_id, month)
    );

    CREATE TABLE IF NOT EXISTS categories(
        user_id TEXT NOT NULL,
        position INTEGER NOT NULL,
        name TEXT NOT NULL,
        PRIMARY KEY(user_id, position)
    );

    CREATE TABLE IF NOT EXISTS clients(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_clients_user ON clients(user_id);

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        current TEXT NOT NULL DEFAULT '0',
        target TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id);
    "#,
    )?;
    Ok(())
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn decimal_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| conversion_error(idx, e))
}

fn uuid_col(r: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = r.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

fn goal_from_row(r: &Row<'_>) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: uuid_col(r, 0)?,
        name: r.get(1)?,
        current: decimal_col(r, 2)?,
        target: decimal_col(r, 3)?,
        created_at: r.get(4)?,
    })
}

fn client_from_row(r: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: uuid_col(r, 0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        phone: r.get(3)?,
        created_at: r.get(4)?,
    })
}

impl MonthStore for SqliteStore {
    fn get_month(&self, user: &str, month: MonthKey) -> Result<Option<MonthBucket>> {
        let row: Option<(Decimal, String, String)> = self
            .conn
            .query_row(
                "SELECT opening_balance, entradas, saidas FROM months WHERE user_id=?1 AND month=?2",
                params![user, month.to_string()],
                |r| Ok((decimal_col(r, 0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?;
        let Some((opening_balance, income, expenses)) = row else {
            return Ok(None);
        };
        Ok(Some(MonthBucket {
            income: serde_json::from_str(&income)?,
            expenses: serde_json::from_str(&expenses)?,
            opening_balance,
        }))
    }

    fn create_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()> {
        debug!(user, %month, "creating month bucket");
        self.conn.execute(
            "INSERT INTO months(user_id, month, opening_balance, entradas, saidas)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user,
                month.to_string(),
                bucket.opening_balance.to_string(),
                serde_json::to_string(&bucket.income)?,
                serde_json::to_string(&bucket.expenses)?
            ],
        )?;
        Ok(())
    }

    fn put_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()> {
        debug!(user, %month, "replacing month bucket");
        self.conn.execute(
            "INSERT INTO months(user_id, month, opening_balance, entradas, saidas)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id, month) DO UPDATE SET
                opening_balance=excluded.opening_balance,
                entradas=excluded.entradas,
                saidas=excluded.saidas,
                updated_at=datetime('now')",
            params![
                user,
                month.to_string(),
                bucket.opening_balance.to_string(),
                serde_json::to_string(&bucket.income)?,
                serde_json::to_string(&bucket.expenses)?
            ],
        )?;
        Ok(())
    }

    fn append_to_month(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        record: &Transaction,
    ) -> Result<()> {
        debug!(user, %month, list = kind.list_name(), id = %record.id, "appending transaction");
        let tx = self.conn.unchecked_transaction()?;
        let mut list = Self::read_list(&tx, user, month, kind)?.unwrap_or_default();
        list.push(record.clone());
        Self::write_list(&tx, user, month, kind, &list)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_month_list(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        records: &[Transaction],
    ) -> Result<()> {
        debug!(user, %month, list = kind.list_name(), len = records.len(), "replacing month list");
        let tx = self.conn.unchecked_transaction()?;
        Self::write_list(&tx, user, month, kind, records)?;
        tx.commit()?;
        Ok(())
    }

    fn set_opening_balance(&self, user: &str, month: MonthKey, value: Decimal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO months(user_id, month, opening_balance) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id, month) DO UPDATE SET
                opening_balance=excluded.opening_balance, updated_at=datetime('now')",
            params![user, month.to_string(), value.to_string()],
        )?;
        Ok(())
    }

    fn list_months(&self, user: &str, year: i32) -> Result<Vec<(MonthKey, MonthBucket)>> {
        let mut stmt = self.conn.prepare(
            "SELECT month FROM months WHERE user_id=?1 AND substr(month,1,4)=?2 ORDER BY month",
        )?;
        let keys = stmt
            .query_map(params![user, format!("{:04}", year)], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let month: MonthKey = key.parse()?;
            if let Some(bucket) = self.get_month(user, month)? {
                out.push((month, bucket));
            }
        }
        Ok(out)
    }
}

impl GoalStore for SqliteStore {
    fn create_goal(&self, user: &str, goal: &SavingsGoal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals(id, user_id, name, current, target, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                goal.id.to_string(),
                user,
                goal.name,
                goal.current.to_string(),
                goal.target.to_string(),
                goal.created_at
            ],
        )?;
        Ok(())
    }

    fn get_goal(&self, user: &str, id: Uuid) -> Result<Option<SavingsGoal>> {
        let goal = self
            .conn
            .query_row(
                "SELECT id, name, current, target, created_at FROM goals WHERE id=?1 AND user_id=?2",
                params![id.to_string(), user],
                goal_from_row,
            )
            .optional()?;
        Ok(goal)
    }

    fn list_goals(&self, user: &str) -> Result<Vec<SavingsGoal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, current, target, created_at FROM goals WHERE user_id=?1
             ORDER BY created_at, name",
        )?;
        let goals = stmt
            .query_map(params![user], goal_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    fn delete_goal(&self, user: &str, id: Uuid) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM goals WHERE id=?1 AND user_id=?2",
            params![id.to_string(), user],
        )?;
        Ok(n > 0)
    }

    fn adjust_goal(&self, user: &str, id: Uuid, delta: Decimal) -> Result<Decimal> {
        // IMMEDIATE takes the write lock before the read, so two adjusters
        // cannot both read the same balance.
        let tx = SqlTransaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let current: Option<Decimal> = tx
            .query_row(
                "SELECT current FROM goals WHERE id=?1 AND user_id=?2",
                params![id.to_string(), user],
                |r| decimal_col(r, 0),
            )
            .optional()?;
        let current = current.ok_or(Error::GoalNotFound(id))?;
        let updated = current.checked_add(delta).ok_or_else(|| {
            Error::Validation(format!("Adjusting goal {} by {} overflows", id, delta))
        })?;
        if updated < Decimal::ZERO {
            return Err(Error::InsufficientBalance {
                goal: id,
                current,
                requested: -delta,
            });
        }
        tx.execute(
            "UPDATE goals SET current=?1 WHERE id=?2 AND user_id=?3",
            params![updated.to_string(), id.to_string(), user],
        )?;
        tx.commit()?;
        debug!(user, goal = %id, %delta, balance = %updated, "goal adjusted");
        Ok(updated)
    }
}

impl DirectoryStore for SqliteStore {
    fn get_categories(&self, user: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM categories WHERE user_id=?1 ORDER BY position")?;
        let names = stmt
            .query_map(params![user], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    fn set_categories(&self, user: &str, categories: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM categories WHERE user_id=?1", params![user])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO categories(user_id, position, name) VALUES (?1, ?2, ?3)")?;
            for (pos, name) in categories.iter().enumerate() {
                stmt.execute(params![user, pos as i64, name])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn create_client(&self, user: &str, client: &Client) -> Result<()> {
        self.conn.execute(
            "INSERT INTO clients(id, user_id, name, email, phone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                client.id.to_string(),
                user,
                client.name,
                client.email,
                client.phone,
                client.created_at
            ],
        )?;
        Ok(())
    }

    fn get_client(&self, user: &str, id: Uuid) -> Result<Option<Client>> {
        let client = self
            .conn
            .query_row(
                "SELECT id, name, email, phone, created_at FROM clients WHERE id=?1 AND user_id=?2",
                params![id.to_string(), user],
                client_from_row,
            )
            .optional()?;
        Ok(client)
    }

    fn list_clients(&self, user: &str) -> Result<Vec<Client>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, phone, created_at FROM clients WHERE user_id=?1
             ORDER BY name COLLATE NOCASE",
        )?;
        let clients = stmt
            .query_map(params![user], client_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(clients)
    }

    fn update_client(&self, user: &str, client: &Client) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE clients SET name=?1, email=?2, phone=?3 WHERE id=?4 AND user_id=?5",
            params![
                client.name,
                client.email,
                client.phone,
                client.id.to_string(),
                user
            ],
        )?;
        Ok(n > 0)
    }

    fn delete_client(&self, user: &str, id: Uuid) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM clients WHERE id=?1 AND user_id=?2",
            params![id.to_string(), user],
        )?;
        Ok(n > 0)
    }

    fn get_profile(&self, user: &str) -> Result<Option<UserProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT uid, display_name, email, created_at FROM users WHERE uid=?1",
                params![user],
                |r| {
                    Ok(UserProfile {
                        uid: r.get(0)?,
                        display_name: r.get(1)?,
                        email: r.get(2)?,
                        created_at: r.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(profile)
    }

    fn put_profile(&self, profile: &UserProfile) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users(uid, display_name, email, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(uid) DO UPDATE SET display_name=excluded.display_name, email=excluded.email",
            params![
                profile.uid,
                profile.display_name,
                profile.email,
                profile.created_at
            ],
        )?;
        Ok(())
    }
}

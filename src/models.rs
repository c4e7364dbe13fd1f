// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "entradas")]
    Income,
    #[serde(rename = "saidas")]
    Expense,
}

impl TransactionKind {
    /// Name of the list holding this kind inside a month document.
    pub fn list_name(&self) -> &'static str {
        match self {
            TransactionKind::Income => "entradas",
            TransactionKind::Expense => "saidas",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Entrada",
            TransactionKind::Expense => "Saída",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entrada" | "entradas" | "income" | "in" => Ok(TransactionKind::Income),
            "saida" | "saidas" | "saída" | "saídas" | "expense" | "out" => {
                Ok(TransactionKind::Expense)
            }
            other => Err(Error::Validation(format!(
                "Unknown transaction type '{}', expected entrada or saida",
                other
            ))),
        }
    }
}

/// Calendar month used as the bucket key, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, Error> {
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(format!("Invalid month number {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn add_months(self, n: u32) -> Self {
        let idx = self.year * 12 + (self.month as i32 - 1) + n as i32;
        Self {
            year: idx.div_euclid(12),
            month: idx.rem_euclid(12) as u32 + 1,
        }
    }

    /// January through December of `year`, in order.
    pub fn months_of(year: i32) -> impl Iterator<Item = MonthKey> {
        (1..=12).map(move |month| MonthKey { year, month })
    }

    pub fn previous(self) -> Self {
        let idx = self.year * 12 + (self.month as i32 - 1) - 1;
        Self {
            year: idx.div_euclid(12),
            month: idx.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(MonthKey::from_date)
            .map_err(|_| Error::Validation(format!("Invalid month '{}', expected YYYY-MM", s)))
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(value: MonthKey) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub total: u32,
    #[serde(rename = "pagas", default)]
    pub paid: u32,
}

/// Position of one generated installment within its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentInfo {
    #[serde(rename = "atual")]
    pub current: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "valorPrevisto")]
    pub planned: Decimal,
    #[serde(rename = "valorReal", default)]
    pub actual: Decimal,
    #[serde(rename = "confirmado", default)]
    pub confirmed: bool,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "clienteId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(rename = "clienteNome", default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(rename = "isRecorrente", default)]
    pub is_recurring: bool,
    #[serde(rename = "mesesRecorrencia", default, skip_serializing_if = "Option::is_none")]
    pub recurring_months: Option<u32>,
    #[serde(rename = "recorrenciaId", default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<Uuid>,
    #[serde(rename = "isParcelado", default)]
    pub is_installment: bool,
    #[serde(rename = "parcelamentoInfo", default, skip_serializing_if = "Option::is_none")]
    pub installment_plan: Option<InstallmentPlan>,
    #[serde(rename = "parcelaInfo", default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<InstallmentInfo>,
    #[serde(rename = "parcelamentoId", default, skip_serializing_if = "Option::is_none")]
    pub installment_id: Option<Uuid>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// How a submitted draft spreads over months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    #[default]
    Single,
    Recurring { months: u32 },
    Installments(InstallmentPlan),
}

/// User input for a new transaction, before ids and series tags are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub date: NaiveDate,
    pub planned: Decimal,
    pub actual: Decimal,
    pub confirmed: bool,
    pub category: Option<String>,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub schedule: Schedule,
}

impl TransactionDraft {
    pub fn new(description: impl Into<String>, date: NaiveDate, planned: Decimal) -> Self {
        Self {
            description: description.into(),
            date,
            planned,
            actual: Decimal::ZERO,
            confirmed: false,
            category: None,
            client_id: None,
            client_name: None,
            schedule: Schedule::Single,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn confirmed_at(mut self, actual: Decimal) -> Self {
        self.actual = actual;
        self.confirmed = true;
        self
    }

    pub fn recurring(mut self, months: u32) -> Self {
        self.schedule = Schedule::Recurring { months };
        self
    }

    pub fn installments(mut self, total: u32, paid: u32) -> Self {
        self.schedule = Schedule::Installments(InstallmentPlan { total, paid });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    #[serde(rename = "entradas", default)]
    pub income: Vec<Transaction>,
    #[serde(rename = "saidas", default)]
    pub expenses: Vec<Transaction>,
    #[serde(rename = "saldoInicial", default)]
    pub opening_balance: Decimal,
}

impl MonthBucket {
    pub fn list(&self, kind: TransactionKind) -> &[Transaction] {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expenses,
        }
    }

    pub fn list_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expenses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: Option<String>,
    #[serde(rename = "telefone")]
    pub phone: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valorAtual")]
    pub current: Decimal,
    #[serde(rename = "metaFinanceira")]
    pub target: Decimal,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

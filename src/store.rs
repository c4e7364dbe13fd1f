// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence seams. Every call is scoped to one user id.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Client, MonthBucket, MonthKey, SavingsGoal, Transaction, TransactionKind, UserProfile,
};

/// Month documents: one bucket per user and calendar month.
pub trait MonthStore {
    fn get_month(&self, user: &str, month: MonthKey) -> Result<Option<MonthBucket>>;
    fn create_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()>;
    /// Replaces the whole bucket, creating it when absent.
    fn put_month(&self, user: &str, month: MonthKey, bucket: &MonthBucket) -> Result<()>;
    /// Appends to one list, creating an empty bucket first when absent.
    fn append_to_month(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        record: &Transaction,
    ) -> Result<()>;
    fn replace_month_list(
        &self,
        user: &str,
        month: MonthKey,
        kind: TransactionKind,
        records: &[Transaction],
    ) -> Result<()>;
    fn set_opening_balance(&self, user: &str, month: MonthKey, value: Decimal) -> Result<()>;
    /// Stored buckets of one calendar year, in month order.
    fn list_months(&self, user: &str, year: i32) -> Result<Vec<(MonthKey, MonthBucket)>>;
}

pub trait GoalStore {
    fn create_goal(&self, user: &str, goal: &SavingsGoal) -> Result<()>;
    fn get_goal(&self, user: &str, id: Uuid) -> Result<Option<SavingsGoal>>;
    fn list_goals(&self, user: &str) -> Result<Vec<SavingsGoal>>;
    fn delete_goal(&self, user: &str, id: Uuid) -> Result<bool>;
    /// Adds `delta` to the goal balance atomically and returns the new value.
    /// Fails without writing when the result would be negative.
    fn adjust_goal(&self, user: &str, id: Uuid, delta: Decimal) -> Result<Decimal>;
}

/// Per-user reference data: categories, clients and the profile record.
pub trait DirectoryStore {
    fn get_categories(&self, user: &str) -> Result<Vec<String>>;
    fn set_categories(&self, user: &str, categories: &[String]) -> Result<()>;
    fn create_client(&self, user: &str, client: &Client) -> Result<()>;
    fn get_client(&self, user: &str, id: Uuid) -> Result<Option<Client>>;
    fn list_clients(&self, user: &str) -> Result<Vec<Client>>;
    fn update_client(&self, user: &str, client: &Client) -> Result<bool>;
    fn delete_client(&self, user: &str, id: Uuid) -> Result<bool>;
    fn get_profile(&self, user: &str) -> Result<Option<UserProfile>>;
    fn put_profile(&self, profile: &UserProfile) -> Result<()>;
}

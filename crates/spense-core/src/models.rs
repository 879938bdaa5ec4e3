//! Expense record types
//!
//! The durable store for these records is an external collaborator; the core
//! only reads and produces field values (see `store::ExpenseStore`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::taxonomy::Category;

/// A stored expense record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    /// Opaque owner identity; all store access is pre-filtered to it.
    pub owner_id: String,
    pub title: String,
    /// Amount in whole cents (see `money`).
    pub amount_cents: i64,
    /// Always a taxonomy member; user-editable.
    pub category: Category,
    /// Last classifier output for this record. Informational only,
    /// never authoritative.
    pub suggested_category: Option<Category>,
    pub occurred_on: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a new expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount_cents: i64,
    pub category: Category,
    pub suggested_category: Option<Category>,
    pub occurred_on: NaiveDate,
    pub description: Option<String>,
}

/// Partial update for an existing expense. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub amount_cents: Option<i64>,
    pub category: Option<Category>,
    pub occurred_on: Option<NaiveDate>,
    /// Outer `None` keeps the current description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

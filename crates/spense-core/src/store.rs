//! Owner-scoped expense store
//!
//! Durable persistence is an external collaborator; the core works against
//! the `ExpenseStore` trait and ships a process-lifetime in-memory
//! implementation for the server and tests. Every operation is pre-filtered
//! to the requesting owner.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{Expense, ExpensePatch, NewExpense};

/// Owner-scoped record access consumed by the core.
pub trait ExpenseStore: Send + Sync {
    /// All records for one owner, newest first.
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Expense>>;

    /// One record by id, if it exists and belongs to the owner.
    fn get(&self, owner_id: &str, id: i64) -> Result<Option<Expense>>;

    fn insert(&self, owner_id: &str, new: NewExpense) -> Result<Expense>;

    fn update(&self, owner_id: &str, id: i64, patch: ExpensePatch) -> Result<Expense>;

    fn delete(&self, owner_id: &str, id: i64) -> Result<()>;
}

/// In-memory store. Contents live for the process lifetime only.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: HashMap<i64, Expense>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::Store("Store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::Store("Store lock poisoned".into()))
    }
}

impl ExpenseStore for MemoryStore {
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Expense>> {
        let inner = self.read()?;
        let mut rows: Vec<Expense> = inner
            .rows
            .values()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn get(&self, owner_id: &str, id: i64) -> Result<Option<Expense>> {
        let inner = self.read()?;
        Ok(inner
            .rows
            .get(&id)
            .filter(|e| e.owner_id == owner_id)
            .cloned())
    }

    fn insert(&self, owner_id: &str, new: NewExpense) -> Result<Expense> {
        let mut inner = self.write()?;
        inner.next_id += 1;
        let now = Utc::now();
        let expense = Expense {
            id: inner.next_id,
            owner_id: owner_id.to_string(),
            title: new.title,
            amount_cents: new.amount_cents,
            category: new.category,
            suggested_category: new.suggested_category,
            occurred_on: new.occurred_on,
            description: new.description,
            created_at: now,
            updated_at: now,
        };
        inner.rows.insert(expense.id, expense.clone());
        Ok(expense)
    }

    fn update(&self, owner_id: &str, id: i64, patch: ExpensePatch) -> Result<Expense> {
        let mut inner = self.write()?;
        let expense = inner
            .rows
            .get_mut(&id)
            .filter(|e| e.owner_id == owner_id)
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))?;

        if let Some(title) = patch.title {
            expense.title = title;
        }
        if let Some(amount_cents) = patch.amount_cents {
            expense.amount_cents = amount_cents;
        }
        if let Some(category) = patch.category {
            expense.category = category;
        }
        if let Some(occurred_on) = patch.occurred_on {
            expense.occurred_on = occurred_on;
        }
        if let Some(description) = patch.description {
            expense.description = description;
        }
        expense.updated_at = Utc::now();
        Ok(expense.clone())
    }

    fn delete(&self, owner_id: &str, id: i64) -> Result<()> {
        let mut inner = self.write()?;
        let owned = inner
            .rows
            .get(&id)
            .map(|e| e.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        inner.rows.remove(&id);
        Ok(())
    }
}

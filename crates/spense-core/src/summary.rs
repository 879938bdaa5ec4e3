//! Monthly spending rollup
//!
//! Buckets are recomputed from the record set on every request; nothing here
//! is cached or stored.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::Expense;
use crate::money;

/// One (year, month) aggregation group.
///
/// Ordering invariant: sequences of buckets are ascending by year then
/// month. Months with no expenses do not appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    /// Summed amount in whole cents. Integer arithmetic only, so currency
    /// sums cannot drift.
    pub total_cents: i64,
}

impl MonthlyBucket {
    /// Human-readable period label, e.g. "Jan 2025".
    pub fn label(&self) -> String {
        // month is always 1..=12 here since it came from a NaiveDate
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }

    /// Summed amount in major units, for presentation.
    pub fn total_major(&self) -> f64 {
        money::to_major(self.total_cents)
    }
}

/// Group expenses by calendar month of `occurred_on` and sum their amounts.
///
/// Input order is irrelevant; empty input yields an empty vec.
pub fn monthly_summary(expenses: &[Expense]) -> Vec<MonthlyBucket> {
    let mut groups: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for e in expenses {
        let key = (e.occurred_on.year(), e.occurred_on.month());
        *groups.entry(key).or_insert(0) += e.amount_cents;
    }

    groups
        .into_iter()
        .map(|((year, month), total_cents)| MonthlyBucket {
            year,
            month,
            total_cents,
        })
        .collect()
}

//! The closed set of expense categories
//!
//! Every stored expense carries exactly one `Category`. Generated text is
//! never written into a category field without passing through
//! `Category::from_canonical` first (see `classify`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A valid expense category label.
///
/// The set is fixed and ordered; `Category::DEFAULT` is the designated
/// fallback label and is itself a member of the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Entertainment,
    Health,
    Education,
    Other,
}

impl Category {
    /// All categories, in canonical order.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    /// The fallback label used whenever classification cannot produce a
    /// member of the set.
    pub const DEFAULT: Category = Category::Other;

    /// Canonical label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Other => "Other",
        }
    }

    /// Parse a label, requiring an exact match to the canonical casing.
    ///
    /// "travel", "Travel!" and "Travel because it was a flight" all fail.
    pub fn from_canonical(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// The full taxonomy as a prompt-ready enumerated list,
    /// e.g. `"Food", "Travel", ...`.
    pub fn prompt_list() -> String {
        Category::ALL
            .iter()
            .map(|c| format!("\"{}\"", c.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::from_canonical(s).ok_or_else(|| format!("Unknown category: {}", s))
    }
}

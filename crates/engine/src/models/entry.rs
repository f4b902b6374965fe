//! Shopping-list entry model.

use cartwheel_core::{EntryId, Priority, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item on a user's shopping list.
///
/// Invariants enforced by the fulfillment engine:
/// - `price` is always positive and `brand` non-empty, because both
///   originate from a resolved catalog product
/// - at most one entry exists per (user, case-insensitive name); a second
///   add merges into the existing entry by summing quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub id: EntryId,
    pub user: UserId,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub brand: String,
    pub notes: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShoppingListEntry {
    /// Create a new entry with default notes, priority, and completion state.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user: UserId,
        name: impl Into<String>,
        quantity: u32,
        category: impl Into<String>,
        unit: impl Into<String>,
        price: Decimal,
        brand: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            user,
            name: name.into(),
            quantity,
            category: category.into(),
            unit: unit.into(),
            price,
            brand: brand.into(),
            notes: None,
            priority: Priority::default(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the updated timestamp after a mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Case-insensitive name comparison used for the merge rule.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ShoppingListEntry {
        ShoppingListEntry::new(
            UserId::new("user-1"),
            "Whole Milk",
            2,
            "Dairy",
            "item",
            Decimal::new(499, 2),
            "Fresh Farm",
        )
    }

    #[test]
    fn test_new_entry_defaults() {
        let entry = entry();
        assert_eq!(entry.priority, Priority::Medium);
        assert!(!entry.completed);
        assert!(entry.notes.is_none());
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn test_name_matches_is_case_insensitive() {
        let entry = entry();
        assert!(entry.name_matches("whole milk"));
        assert!(entry.name_matches("  WHOLE MILK  "));
        assert!(!entry.name_matches("skim milk"));
    }

    #[test]
    fn test_touch_advances_updated_at() {
        let mut entry = entry();
        let before = entry.updated_at;
        entry.touch();
        assert!(entry.updated_at >= before);
    }
}

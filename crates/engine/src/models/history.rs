//! Purchase history model.

use cartwheel_core::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ShoppingListEntry;

/// Store label recorded on every purchase snapshot.
pub const ONLINE_STORE: &str = "Online Store";

/// An immutable snapshot of a purchased list entry.
///
/// Written once when a list entry is cleared/finalized, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub user: UserId,
    pub item_name: String,
    pub quantity: u32,
    pub category: String,
    pub unit: String,
    pub price: Decimal,
    pub brand: String,
    pub store: String,
    pub purchased_at: DateTime<Utc>,
}

impl PurchaseRecord {
    /// Snapshot a shopping-list entry at purchase time.
    #[must_use]
    pub fn from_entry(entry: &ShoppingListEntry) -> Self {
        Self {
            user: entry.user.clone(),
            item_name: entry.name.clone(),
            quantity: entry.quantity,
            category: entry.category.clone(),
            unit: entry.unit.clone(),
            price: entry.price,
            brand: entry.brand.clone(),
            store: ONLINE_STORE.to_string(),
            purchased_at: Utc::now(),
        }
    }
}

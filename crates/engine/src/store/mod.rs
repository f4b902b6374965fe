//! Storage interfaces consumed by the engine.
//!
//! The engine only depends on these traits; it never owns persistence.
//! [`memory`] provides thread-safe in-memory implementations used by tests
//! and small single-process deployments. A database-backed implementation
//! can be swapped in without touching the engines.
//!
//! All store operations are synchronous and request-scoped. The catalog is
//! read-only from the engine's perspective, so no write contention exists
//! there. The list store's merge-or-create path is read-then-write without
//! locking; concurrent adds of the same item can lose an update, which is an
//! accepted weak-consistency trade-off.

pub mod memory;

use cartwheel_core::{EntryId, Priority, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CatalogProduct, PurchaseRecord, ShoppingListEntry};

pub use memory::{InMemoryCatalog, InMemoryHistory, InMemoryList};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage backend failed (poisoned lock, connection loss, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Read-only view of the product catalog.
pub trait CatalogStore {
    /// All products currently in stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_in_stock(&self) -> Result<Vec<CatalogProduct>, StoreError>;

    /// Look up a product by identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_by_id(&self, id: ProductId) -> Result<Option<CatalogProduct>, StoreError>;

    /// In-stock products in a category (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_by_category(&self, category: &str) -> Result<Vec<CatalogProduct>, StoreError>;

    /// Generic text search over name, description, and category.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn text_search(&self, query: &str) -> Result<Vec<CatalogProduct>, StoreError>;

    /// Filtered search over optional query, brand, and price ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn search_by_criteria(
        &self,
        query: Option<&str>,
        brand: Option<&str>,
        max_price: Option<Decimal>,
    ) -> Result<Vec<CatalogProduct>, StoreError>;
}

/// CRUD over shopping-list entries, keyed by (user, id) and
/// (user, case-insensitive name).
pub trait ListStore {
    /// Persist a new entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert(&self, entry: ShoppingListEntry) -> Result<ShoppingListEntry, StoreError>;

    /// Replace an existing entry (matched by id).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn update(&self, entry: ShoppingListEntry) -> Result<ShoppingListEntry, StoreError>;

    /// Delete an entry; returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, user: &UserId, id: EntryId) -> Result<bool, StoreError>;

    /// Look up an entry by (user, id).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find(&self, user: &UserId, id: EntryId) -> Result<Option<ShoppingListEntry>, StoreError>;

    /// Look up an entry by (user, case-insensitive name).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_by_name(
        &self,
        user: &UserId,
        name: &str,
    ) -> Result<Option<ShoppingListEntry>, StoreError>;

    /// All entries for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list(&self, user: &UserId) -> Result<Vec<ShoppingListEntry>, StoreError>;

    /// Number of entries for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn count(&self, user: &UserId) -> Result<u64, StoreError>;

    /// Entries filtered by completion state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn by_completed(
        &self,
        user: &UserId,
        completed: bool,
    ) -> Result<Vec<ShoppingListEntry>, StoreError>;

    /// Entries filtered by priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn by_priority(
        &self,
        user: &UserId,
        priority: Priority,
    ) -> Result<Vec<ShoppingListEntry>, StoreError>;
}

/// Append-only purchase history.
pub trait HistoryStore {
    /// Record a purchase snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn append(&self, record: PurchaseRecord) -> Result<(), StoreError>;

    /// All records for a user, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn for_user(&self, user: &UserId) -> Result<Vec<PurchaseRecord>, StoreError>;

    /// Records for a user purchased after the given instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn purchased_after(
        &self,
        user: &UserId,
        after: DateTime<Utc>,
    ) -> Result<Vec<PurchaseRecord>, StoreError>;
}

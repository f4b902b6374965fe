//! Thread-safe in-memory store implementations.
//!
//! Backing storage for tests and small single-process deployments. Each
//! store is a `RwLock`-guarded `Vec`, which keeps scan order stable: the
//! resolver's "ranked arbitrarily stable" contract is insertion order here.

use std::sync::RwLock;

use cartwheel_core::{EntryId, Priority, ProductId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{CatalogProduct, PurchaseRecord, ShoppingListEntry};

use super::{CatalogStore, HistoryStore, ListStore, StoreError};

fn poisoned(which: &str) -> StoreError {
    StoreError::Backend(format!("{which} store lock poisoned"))
}

/// In-memory product catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<CatalogProduct>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog seeded with products.
    #[must_use]
    pub fn with_products(products: Vec<CatalogProduct>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }
}

impl CatalogStore for InMemoryCatalog {
    fn list_in_stock(&self) -> Result<Vec<CatalogProduct>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products.iter().filter(|p| p.in_stock).cloned().collect())
    }

    fn find_by_id(&self, id: ProductId) -> Result<Option<CatalogProduct>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_category(&self, category: &str) -> Result<Vec<CatalogProduct>, StoreError> {
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products
            .iter()
            .filter(|p| p.in_stock && p.category.eq_ignore_ascii_case(category))
            .cloned()
            .collect())
    }

    fn text_search(&self, query: &str) -> Result<Vec<CatalogProduct>, StoreError> {
        let needle = query.trim().to_lowercase();
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products
            .iter()
            .filter(|p| {
                p.in_stock
                    && (p.name.to_lowercase().contains(&needle)
                        || p.description.to_lowercase().contains(&needle)
                        || p.category.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    fn search_by_criteria(
        &self,
        query: Option<&str>,
        brand: Option<&str>,
        max_price: Option<Decimal>,
    ) -> Result<Vec<CatalogProduct>, StoreError> {
        let needle = query.map(|q| q.trim().to_lowercase());
        let products = self.products.read().map_err(|_| poisoned("catalog"))?;
        Ok(products
            .iter()
            .filter(|p| p.in_stock)
            .filter(|p| {
                needle.as_ref().is_none_or(|q| {
                    p.name.to_lowercase().contains(q) || p.description.to_lowercase().contains(q)
                })
            })
            .filter(|p| brand.is_none_or(|b| p.brand.eq_ignore_ascii_case(b)))
            .filter(|p| max_price.is_none_or(|max| p.price <= max))
            .cloned()
            .collect())
    }
}

/// In-memory shopping-list store.
#[derive(Debug, Default)]
pub struct InMemoryList {
    entries: RwLock<Vec<ShoppingListEntry>>,
}

impl InMemoryList {
    /// Create an empty list store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListStore for InMemoryList {
    fn insert(&self, entry: ShoppingListEntry) -> Result<ShoppingListEntry, StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned("list"))?;
        entries.push(entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: ShoppingListEntry) -> Result<ShoppingListEntry, StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned("list"))?;
        if let Some(existing) = entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry.clone();
        }
        Ok(entry)
    }

    fn delete(&self, user: &UserId, id: EntryId) -> Result<bool, StoreError> {
        let mut entries = self.entries.write().map_err(|_| poisoned("list"))?;
        let before = entries.len();
        entries.retain(|e| !(e.user == *user && e.id == id));
        Ok(entries.len() < before)
    }

    fn find(&self, user: &UserId, id: EntryId) -> Result<Option<ShoppingListEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries
            .iter()
            .find(|e| e.user == *user && e.id == id)
            .cloned())
    }

    fn find_by_name(
        &self,
        user: &UserId,
        name: &str,
    ) -> Result<Option<ShoppingListEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries
            .iter()
            .find(|e| e.user == *user && e.name_matches(name))
            .cloned())
    }

    fn list(&self, user: &UserId) -> Result<Vec<ShoppingListEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries.iter().filter(|e| e.user == *user).cloned().collect())
    }

    fn count(&self, user: &UserId) -> Result<u64, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries.iter().filter(|e| e.user == *user).count() as u64)
    }

    fn by_completed(
        &self,
        user: &UserId,
        completed: bool,
    ) -> Result<Vec<ShoppingListEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries
            .iter()
            .filter(|e| e.user == *user && e.completed == completed)
            .cloned()
            .collect())
    }

    fn by_priority(
        &self,
        user: &UserId,
        priority: Priority,
    ) -> Result<Vec<ShoppingListEntry>, StoreError> {
        let entries = self.entries.read().map_err(|_| poisoned("list"))?;
        Ok(entries
            .iter()
            .filter(|e| e.user == *user && e.priority == priority)
            .cloned()
            .collect())
    }
}

/// In-memory purchase history.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    records: RwLock<Vec<PurchaseRecord>>,
}

impl InMemoryHistory {
    /// Create an empty history store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, record: PurchaseRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| poisoned("history"))?;
        records.push(record);
        Ok(())
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<PurchaseRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned("history"))?;
        Ok(records.iter().filter(|r| r.user == *user).cloned().collect())
    }

    fn purchased_after(
        &self,
        user: &UserId,
        after: DateTime<Utc>,
    ) -> Result<Vec<PurchaseRecord>, StoreError> {
        let records = self.records.read().map_err(|_| poisoned("history"))?;
        Ok(records
            .iter()
            .filter(|r| r.user == *user && r.purchased_at > after)
            .cloned()
            .collect())
    }
}

//! Fulfillment engine: structured commands against the shopping list.
//!
//! Enforces the two list invariants:
//!
//! - every persisted entry carries a positive price and a brand, both
//!   originating from a resolved catalog product - the list is a subset of
//!   the catalog, never an arbitrary text bag
//! - at most one entry per (user, case-insensitive name); a second add
//!   merges by summing quantity
//!
//! An add either fully succeeds (entry created or merged) or fails with no
//! persisted change. The merge-or-create step is read-then-write without
//! locking; concurrent adds of the same item can lose an update, which is
//! an accepted weak-consistency trade-off.

use cartwheel_core::{EntryId, Priority, ProductId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::error::EngineError;
use crate::models::{PurchaseRecord, ShoppingListEntry};
use crate::provider::TextProvider;
use crate::resolver::ProductResolver;
use crate::store::{CatalogStore, HistoryStore, ListStore};

/// Parameters for an add operation.
///
/// `price` and `brand` are optional; when either is absent the item name is
/// resolved against the catalog and the first candidate fills the gaps.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub price: Option<Decimal>,
    pub brand: Option<String>,
}

impl AddItem {
    /// Add request with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: u32, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            category: category.into(),
            unit: None,
            notes: None,
            priority: None,
            price: None,
            brand: None,
        }
    }
}

/// Partial update of an existing entry.
///
/// Fields left as `None` are untouched. An update with every field `None`
/// silently no-ops (partial-update semantics) apart from refreshing the
/// updated timestamp.
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub quantity: Option<u32>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

/// Executes structured commands against a user's shopping list.
pub struct FulfillmentEngine<'a, C, L, H, P> {
    catalog: &'a C,
    list: &'a L,
    history: &'a H,
    provider: &'a P,
}

impl<'a, C, L, H, P> FulfillmentEngine<'a, C, L, H, P>
where
    C: CatalogStore,
    L: ListStore,
    H: HistoryStore,
    P: TextProvider,
{
    /// Create a new fulfillment engine over the given stores and provider.
    #[must_use]
    pub const fn new(catalog: &'a C, list: &'a L, history: &'a H, provider: &'a P) -> Self {
        Self {
            catalog,
            list,
            history,
            provider,
        }
    }

    /// Add an item to the user's list, merging into an existing entry when
    /// one with the same (case-insensitive) name exists.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a blank user, blank item name,
    ///   zero quantity, or a non-positive price
    /// - [`EngineError::NotFound`] when price/brand are absent and the
    ///   resolver returns no candidates
    #[instrument(skip(self, request), fields(user = %user, item = %request.name))]
    pub async fn add_item(
        &self,
        user: &UserId,
        request: AddItem,
    ) -> Result<ShoppingListEntry, EngineError> {
        if user.is_blank() {
            return Err(EngineError::validation("user id is required"));
        }
        if request.name.trim().is_empty() {
            return Err(EngineError::validation("item name is required"));
        }
        if request.quantity == 0 {
            return Err(EngineError::validation("quantity must be positive"));
        }

        let mut price = request.price;
        let mut brand = request.brand.clone();

        // Pricing data must originate from the catalog
        if price.is_none() || brand.is_none() {
            let resolver = ProductResolver::new(self.catalog, self.provider);
            let candidates = resolver.resolve(&request.name).await?;
            match candidates.first() {
                Some(product) => {
                    debug!(product = %product.name, "resolved item for pricing data");
                    price = price.or(Some(product.price));
                    brand = brand.or_else(|| Some(product.brand.clone()));
                }
                None => {
                    return Err(EngineError::not_found(format!(
                        "product '{}' not found in catalog",
                        request.name
                    )));
                }
            }
        }

        let price = price.filter(|p| *p > Decimal::ZERO).ok_or_else(|| {
            EngineError::validation(format!(
                "product '{}' has no valid price; cannot add items without pricing information",
                request.name
            ))
        })?;
        let brand = brand.unwrap_or_default();

        match self.list.find_by_name(user, &request.name)? {
            Some(mut existing) => {
                existing.quantity += request.quantity;
                if let Some(notes) = request.notes {
                    existing.notes = Some(notes);
                }
                if let Some(priority) = request.priority {
                    existing.priority = priority;
                }
                existing.price = price;
                existing.brand = brand;
                existing.touch();
                Ok(self.list.update(existing)?)
            }
            None => {
                let mut entry = ShoppingListEntry::new(
                    user.clone(),
                    request.name,
                    request.quantity,
                    request.category,
                    request.unit.unwrap_or_else(|| "item".to_string()),
                    price,
                    brand,
                );
                entry.notes = request.notes;
                entry.priority = request.priority.unwrap_or_default();
                Ok(self.list.insert(entry)?)
            }
        }
    }

    /// Add a catalog product to the list by identity; reuses the same merge
    /// logic as [`Self::add_item`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no product has the given id.
    #[instrument(skip(self), fields(user = %user, product = %product_id))]
    pub async fn add_item_from_product(
        &self,
        user: &UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<ShoppingListEntry, EngineError> {
        let product = self
            .catalog
            .find_by_id(product_id)?
            .ok_or_else(|| EngineError::not_found(format!("product not found: {product_id}")))?;

        let request = AddItem {
            price: Some(product.price),
            brand: Some(product.brand.clone()),
            ..AddItem::new(product.name, quantity, product.category)
        };
        self.add_item(user, request).await
    }

    /// Set the quantity of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the entry does not exist for
    /// that user, or [`EngineError::Validation`] for a zero quantity.
    pub fn update_item_quantity(
        &self,
        user: &UserId,
        id: EntryId,
        quantity: u32,
    ) -> Result<ShoppingListEntry, EngineError> {
        self.update_item(
            user,
            id,
            UpdateItem {
                quantity: Some(quantity),
                ..UpdateItem::default()
            },
        )
    }

    /// Apply a partial update to an existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the entry does not exist for
    /// that user, or [`EngineError::Validation`] for a zero quantity.
    #[instrument(skip(self, update), fields(user = %user, entry = %id))]
    pub fn update_item(
        &self,
        user: &UserId,
        id: EntryId,
        update: UpdateItem,
    ) -> Result<ShoppingListEntry, EngineError> {
        if update.quantity == Some(0) {
            return Err(EngineError::validation("quantity must be positive"));
        }

        let mut entry = self
            .list
            .find(user, id)?
            .ok_or_else(|| EngineError::not_found("item not found in user's shopping list"))?;

        if let Some(quantity) = update.quantity {
            entry.quantity = quantity;
        }
        if let Some(notes) = update.notes {
            entry.notes = Some(notes);
        }
        if let Some(priority) = update.priority {
            entry.priority = priority;
        }
        if let Some(completed) = update.completed {
            entry.completed = completed;
        }
        entry.touch();
        Ok(self.list.update(entry)?)
    }

    /// Remove an entry from the user's list.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the entry does not exist for
    /// that user.
    pub fn remove_item(&self, user: &UserId, id: EntryId) -> Result<(), EngineError> {
        if self.list.delete(user, id)? {
            Ok(())
        } else {
            Err(EngineError::not_found(
                "item not found in user's shopping list",
            ))
        }
    }

    /// Mark an entry completed or uncompleted.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the entry does not exist for
    /// that user.
    pub fn mark_completed(
        &self,
        user: &UserId,
        id: EntryId,
        completed: bool,
    ) -> Result<ShoppingListEntry, EngineError> {
        self.update_item(
            user,
            id,
            UpdateItem {
                completed: Some(completed),
                ..UpdateItem::default()
            },
        )
    }

    /// Look up an entry by (user, case-insensitive name).
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn find_item_by_name(
        &self,
        user: &UserId,
        name: &str,
    ) -> Result<Option<ShoppingListEntry>, EngineError> {
        Ok(self.list.find_by_name(user, name)?)
    }

    /// The user's full shopping list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn shopping_list(&self, user: &UserId) -> Result<Vec<ShoppingListEntry>, EngineError> {
        Ok(self.list.list(user)?)
    }

    /// Number of entries on the user's list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn item_count(&self, user: &UserId) -> Result<u64, EngineError> {
        Ok(self.list.count(user)?)
    }

    /// Entries already checked off.
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn completed_items(&self, user: &UserId) -> Result<Vec<ShoppingListEntry>, EngineError> {
        Ok(self.list.by_completed(user, true)?)
    }

    /// Entries still to buy.
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn pending_items(&self, user: &UserId) -> Result<Vec<ShoppingListEntry>, EngineError> {
        Ok(self.list.by_completed(user, false)?)
    }

    /// Entries with the given priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the list store fails.
    pub fn items_by_priority(
        &self,
        user: &UserId,
        priority: Priority,
    ) -> Result<Vec<ShoppingListEntry>, EngineError> {
        Ok(self.list.by_priority(user, priority)?)
    }

    /// Clear the user's list, snapshotting every entry into the purchase
    /// history first. Returns the number of cleared entries.
    ///
    /// # Errors
    ///
    /// Returns an error if a store operation fails.
    #[instrument(skip(self), fields(user = %user))]
    pub fn clear_list(&self, user: &UserId) -> Result<usize, EngineError> {
        let entries = self.list.list(user)?;
        for entry in &entries {
            self.history.append(PurchaseRecord::from_entry(entry))?;
            self.list.delete(user, entry.id)?;
        }
        debug!(cleared = entries.len(), "cleared shopping list");
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::CatalogProduct;
    use crate::provider::testing::StubProvider;
    use crate::store::{InMemoryCatalog, InMemoryHistory, InMemoryList};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::with_products(vec![
            CatalogProduct::new(
                "Whole Milk",
                "Fresh Farm",
                Decimal::new(499, 2),
                "Dairy",
                "Fresh organic whole milk",
            ),
            CatalogProduct::new(
                "Whole Wheat Bread",
                "Wonder",
                Decimal::new(299, 2),
                "Bakery",
                "Whole grain bread",
            ),
        ])
    }

    struct Fixture {
        catalog: InMemoryCatalog,
        list: InMemoryList,
        history: InMemoryHistory,
        provider: StubProvider,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: catalog(),
                list: InMemoryList::new(),
                history: InMemoryHistory::new(),
                provider: StubProvider::failing(),
            }
        }

        fn engine(
            &self,
        ) -> FulfillmentEngine<'_, InMemoryCatalog, InMemoryList, InMemoryHistory, StubProvider>
        {
            FulfillmentEngine::new(&self.catalog, &self.list, &self.history, &self.provider)
        }
    }

    fn user() -> UserId {
        UserId::new("user-1")
    }

    #[tokio::test]
    async fn test_add_resolves_price_and_brand_from_catalog() {
        let fixture = Fixture::new();
        let entry = fixture
            .engine()
            .add_item(&user(), AddItem::new("milk", 2, "Other"))
            .await
            .expect("add");
        assert_eq!(entry.price, Decimal::new(499, 2));
        assert_eq!(entry.brand, "Fresh Farm");
        assert_eq!(entry.unit, "item");
        assert_eq!(entry.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_add_merges_duplicate_by_summing_quantity() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let first = engine
            .add_item(&user(), AddItem::new("milk", 2, "Other"))
            .await
            .expect("first add");
        let merged = engine
            .add_item(&user(), AddItem::new("MILK", 3, "Other"))
            .await
            .expect("second add");

        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 5);
        assert_eq!(merged.price, first.price);
        assert_eq!(merged.brand, first.brand);
        assert_eq!(engine.item_count(&user()).expect("count"), 1);
    }

    #[tokio::test]
    async fn test_add_unresolvable_item_fails_without_persisting() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let result = engine
            .add_item(&user(), AddItem::new("motor oil", 1, "Other"))
            .await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
        assert_eq!(engine.item_count(&user()).expect("count"), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_price() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let request = AddItem {
            price: Some(Decimal::ZERO),
            brand: Some("Fresh Farm".to_string()),
            ..AddItem::new("milk", 1, "Dairy")
        };
        let result = engine.add_item(&user(), request).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(engine.item_count(&user()).expect("count"), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity_and_blank_user() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let result = engine.add_item(&user(), AddItem::new("milk", 0, "Other")).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = engine
            .add_item(&UserId::new(""), AddItem::new("milk", 1, "Other"))
            .await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_from_product_by_identity() {
        let fixture = Fixture::new();
        let engine = fixture.engine();
        let product_id = fixture
            .catalog
            .list_in_stock()
            .expect("list")
            .first()
            .expect("seeded")
            .id;

        let entry = engine
            .add_item_from_product(&user(), product_id, 3)
            .await
            .expect("add");
        assert_eq!(entry.name, "Whole Milk");
        assert_eq!(entry.quantity, 3);

        let missing = engine
            .add_item_from_product(&user(), ProductId::new(), 1)
            .await;
        assert!(matches!(missing, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_item_partial_fields() {
        let fixture = Fixture::new();
        let engine = fixture.engine();
        let entry = engine
            .add_item(&user(), AddItem::new("milk", 1, "Other"))
            .await
            .expect("add");

        let updated = engine
            .update_item(
                &user(),
                entry.id,
                UpdateItem {
                    notes: Some("2% if available".to_string()),
                    priority: Some(Priority::High),
                    ..UpdateItem::default()
                },
            )
            .expect("update");
        assert_eq!(updated.quantity, 1);
        assert_eq!(updated.notes.as_deref(), Some("2% if available"));
        assert_eq!(updated.priority, Priority::High);

        // All-None update is a silent no-op apart from the timestamp.
        let unchanged = engine
            .update_item(&user(), entry.id, UpdateItem::default())
            .expect("update");
        assert_eq!(unchanged.quantity, 1);
        assert_eq!(unchanged.notes.as_deref(), Some("2% if available"));
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_not_found() {
        let fixture = Fixture::new();
        let engine = fixture.engine();

        let result = engine.update_item_quantity(&user(), EntryId::new(), 2);
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove_item() {
        let fixture = Fixture::new();
        let engine = fixture.engine();
        let entry = engine
            .add_item(&user(), AddItem::new("milk", 1, "Other"))
            .await
            .expect("add");

        engine.remove_item(&user(), entry.id).expect("remove");
        let again = engine.remove_item(&user(), entry.id);
        assert!(matches!(again, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_completed_filters() {
        let fixture = Fixture::new();
        let engine = fixture.engine();
        let milk = engine
            .add_item(&user(), AddItem::new("milk", 1, "Other"))
            .await
            .expect("add");
        engine
            .add_item(&user(), AddItem::new("bread", 1, "Other"))
            .await
            .expect("add");

        engine.mark_completed(&user(), milk.id, true).expect("complete");
        assert_eq!(engine.completed_items(&user()).expect("query").len(), 1);
        assert_eq!(engine.pending_items(&user()).expect("query").len(), 1);
    }

    #[tokio::test]
    async fn test_clear_list_snapshots_purchases() {
        let fixture = Fixture::new();
        let engine = fixture.engine();
        engine
            .add_item(&user(), AddItem::new("milk", 2, "Other"))
            .await
            .expect("add");
        engine
            .add_item(&user(), AddItem::new("bread", 1, "Other"))
            .await
            .expect("add");

        let cleared = engine.clear_list(&user()).expect("clear");
        assert_eq!(cleared, 2);
        assert_eq!(engine.item_count(&user()).expect("count"), 0);

        use crate::store::HistoryStore;
        let records = fixture.history.for_user(&user()).expect("history");
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.item_name == "milk" && r.quantity == 2));
    }
}

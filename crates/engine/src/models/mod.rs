//! Domain models for the shopping pipeline.
//!
//! - [`CatalogProduct`] - read-only product from the catalog store
//! - [`ShoppingListEntry`] - a line item on a user's list
//! - [`PurchaseRecord`] - immutable snapshot written at list-clear time

pub mod entry;
pub mod history;
pub mod product;

pub use entry::ShoppingListEntry;
pub use history::PurchaseRecord;
pub use product::CatalogProduct;

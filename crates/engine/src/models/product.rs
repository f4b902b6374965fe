//! Catalog product model.

use cartwheel_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable product from the catalog.
///
/// Immutable from the engine's perspective; the catalog store owns the data
/// and is the source of truth for price and brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub price: Decimal,
    pub category: String,
    pub description: String,
    pub in_stock: bool,
}

impl CatalogProduct {
    /// Create an in-stock product.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        brand: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            brand: brand.into(),
            price,
            category: category.into(),
            description: description.into(),
            in_stock: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product_is_in_stock() {
        let product = CatalogProduct::new(
            "Whole Milk",
            "Fresh Farm",
            Decimal::new(499, 2),
            "Dairy",
            "Fresh organic whole milk",
        );
        assert!(product.in_stock);
        assert_eq!(product.price, Decimal::new(499, 2));
    }
}

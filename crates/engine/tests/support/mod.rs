//! Shared fixtures for integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use rust_decimal::Decimal;

use cartwheel_engine::models::CatalogProduct;
use cartwheel_engine::provider::{ProviderError, TextProvider};
use cartwheel_engine::store::InMemoryCatalog;

/// Provider that replays a fixed script of responses, one per call.
/// An exhausted script fails every remaining call, which exercises the
/// deterministic fallbacks.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(String::from).collect()),
        }
    }

    /// A provider whose every call fails.
    #[must_use]
    pub fn offline() -> Self {
        Self::new([])
    }
}

impl TextProvider for ScriptedProvider {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.script
            .lock()
            .map_err(|_| ProviderError::Parse("script lock poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| ProviderError::Parse("script exhausted".to_string()))
    }
}

/// A small grocery catalog shared by the integration scenarios.
#[must_use]
pub fn grocery_catalog() -> InMemoryCatalog {
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
        CatalogProduct::new(
            "Eggs",
            "Happy Hen",
            Decimal::new(349, 2),
            "Dairy",
            "Free-range dozen",
        ),
        CatalogProduct::new(
            "Butter",
            "Kerrygold",
            Decimal::new(599, 2),
            "Dairy",
            "Salted butter",
        ),
    ])
}

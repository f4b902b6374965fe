//! Product resolver: fuzzy item names to concrete catalog products.
//!
//! Resolution escalates through three stages, each only when the previous
//! one found nothing:
//!
//! 1. case-insensitive substring match against in-stock product names
//! 2. reverse heuristic: containment in either direction, or any token of
//!    the query matching any token of a product name
//! 3. AI-assisted lookup, with every candidate re-validated against the
//!    live catalog by exact (case-insensitive) name match
//!
//! The re-validation in stage 3 is mandatory: the provider is never trusted
//! to invent or rename products, so the resolver can guarantee it only ever
//! returns products that exist in the catalog at resolution time.

use tracing::{debug, instrument, warn};

use crate::models::CatalogProduct;
use crate::provider::TextProvider;
use crate::store::{CatalogStore, StoreError};

/// Maximum number of candidates a resolution returns.
const MAX_CANDIDATES: usize = 5;

/// Maps a free-text item name to catalog products, best match first.
pub struct ProductResolver<'a, C, P> {
    catalog: &'a C,
    provider: &'a P,
}

impl<'a, C: CatalogStore, P: TextProvider> ProductResolver<'a, C, P> {
    /// Create a new resolver over the given catalog and provider.
    #[must_use]
    pub const fn new(catalog: &'a C, provider: &'a P) -> Self {
        Self { catalog, provider }
    }

    /// Resolve an item name to at most five in-stock catalog products.
    ///
    /// An empty result means the name could not be matched; a provider
    /// failure in stage 3 is absorbed and also yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error only if the catalog store fails.
    #[instrument(skip(self), fields(item = %item_name))]
    pub async fn resolve(&self, item_name: &str) -> Result<Vec<CatalogProduct>, StoreError> {
        let query = item_name.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let in_stock = self.catalog.list_in_stock()?;

        let substring_matches: Vec<CatalogProduct> = in_stock
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .take(MAX_CANDIDATES)
            .cloned()
            .collect();
        if !substring_matches.is_empty() {
            debug!(count = substring_matches.len(), "substring match");
            return Ok(substring_matches);
        }

        let reverse_matches: Vec<CatalogProduct> = in_stock
            .iter()
            .filter(|p| is_related(&query, &p.name.to_lowercase()))
            .take(MAX_CANDIDATES)
            .cloned()
            .collect();
        if !reverse_matches.is_empty() {
            debug!(count = reverse_matches.len(), "reverse heuristic match");
            return Ok(reverse_matches);
        }

        Ok(self.resolve_with_provider(item_name, &in_stock).await)
    }

    /// Stage 3: ask the provider for exact catalog names, then re-validate
    /// every candidate against the live catalog.
    async fn resolve_with_provider(
        &self,
        item_name: &str,
        in_stock: &[CatalogProduct],
    ) -> Vec<CatalogProduct> {
        let catalog_names = in_stock
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = build_resolution_prompt(item_name, &catalog_names);

        match self.provider.generate(&prompt).await {
            Ok(response) => {
                let validated = validate_candidates(&response, in_stock);
                if validated.is_empty() {
                    debug!(%response, "no provider candidate survived catalog validation");
                }
                validated
            }
            Err(error) => {
                warn!(%error, "provider resolution failed, returning no candidates");
                Vec::new()
            }
        }
    }
}

/// Reverse heuristic: containment in either direction, or token overlap.
fn is_related(query: &str, product_name: &str) -> bool {
    if product_name.contains(query) || query.contains(product_name) {
        return true;
    }
    query.split_whitespace().any(|query_word| {
        product_name.split_whitespace().any(|product_word| {
            query_word == product_word
                || product_word.contains(query_word)
                || query_word.contains(product_word)
        })
    })
}

/// Build the constrained prompt for AI-assisted resolution.
fn build_resolution_prompt(item_name: &str, catalog_names: &str) -> String {
    format!(
        "STRICT INSTRUCTIONS: You must ONLY return exact product names from the provided list.\n\n\
         User requested: '{item_name}'\n\
         Available products in database: [{catalog_names}]\n\n\
         RULES:\n\
         1. ONLY suggest products that appear EXACTLY in the available products list above\n\
         2. Copy the product names EXACTLY as they appear (including capitalization)\n\
         3. If '{item_name}' relates to any products in the list, suggest 1-2 most relevant ones\n\
         4. If '{item_name}' is not a grocery item, return 'none'\n\
         5. Separate multiple suggestions with commas\n\n\
         Examples:\n\
         - If user wants 'milk' and list contains 'Whole Milk', return: Whole Milk\n\
         - If user wants 'bread' and list contains 'Whole Wheat Bread', return: Whole Wheat Bread\n\
         - If user wants 'cat', return: none\n\n\
         Response (exact product names only):"
    )
}

/// Split a provider response on commas and keep only candidates that exist
/// in the catalog by case-insensitive exact name match.
fn validate_candidates(response: &str, catalog: &[CatalogProduct]) -> Vec<CatalogProduct> {
    let response = response.trim();
    if response.is_empty() || response.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    response
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .filter_map(|candidate| {
            catalog
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(candidate))
                .cloned()
        })
        .take(MAX_CANDIDATES)
        .collect()
}

//! Recommendation engine: complementary product suggestions.
//!
//! Blends three inputs into a provider prompt - the current list, recent
//! purchase history, and the in-stock catalog - then validates, filters,
//! and deduplicates the response. Whenever the provider path yields
//! nothing (failure, malformed response, or everything filtered out), a
//! deterministic frequency ranking over all-time purchase history takes
//! over, with the same current-list exclusion, dedup, and cap applied.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use cartwheel_core::UserId;

use crate::error::EngineError;
use crate::models::{PurchaseRecord, ShoppingListEntry};
use crate::provider::TextProvider;
use crate::store::{CatalogStore, HistoryStore, ListStore};

/// How far back the history window for the provider prompt reaches.
const HISTORY_WINDOW_DAYS: i64 = 30;

/// Maximum distinct history names embedded in the prompt.
const HISTORY_PROMPT_CAP: usize = 10;

/// What the suggestions were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    CurrentList,
    History,
    NoData,
}

/// Ranked product suggestions for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub suggestions: Vec<String>,
    pub basis: Basis,
}

/// Produces ranked, deduplicated product suggestions.
pub struct RecommendationEngine<'a, C, L, H, P> {
    catalog: &'a C,
    list: &'a L,
    history: &'a H,
    provider: &'a P,
    max_items: usize,
}

impl<'a, C, L, H, P> RecommendationEngine<'a, C, L, H, P>
where
    C: CatalogStore,
    L: ListStore,
    H: HistoryStore,
    P: TextProvider,
{
    /// Create a new recommendation engine.
    ///
    /// `max_items` caps the number of returned suggestions.
    #[must_use]
    pub const fn new(
        catalog: &'a C,
        list: &'a L,
        history: &'a H,
        provider: &'a P,
        max_items: usize,
    ) -> Self {
        Self {
            catalog,
            list,
            history,
            provider,
            max_items,
        }
    }

    /// Generate suggestions for a user.
    ///
    /// # Errors
    ///
    /// Returns an error only if a store operation fails; provider failures
    /// degrade to the frequency fallback.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn recommend(&self, user: &UserId) -> Result<Recommendations, EngineError> {
        let current = self.list.list(user)?;
        let current_names: Vec<String> = current.iter().map(|e| e.name.clone()).collect();

        let cutoff = Utc::now() - Duration::days(HISTORY_WINDOW_DAYS);
        let mut recent = self.history.purchased_after(user, cutoff)?;
        recent.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        let history_names = distinct_names(recent.iter().map(|r| r.item_name.as_str()))
            .into_iter()
            .take(HISTORY_PROMPT_CAP)
            .collect::<Vec<_>>();

        if current_names.is_empty() && history_names.is_empty() {
            return Ok(Recommendations {
                suggestions: Vec::new(),
                basis: Basis::NoData,
            });
        }

        let basis = if current_names.is_empty() {
            Basis::History
        } else {
            Basis::CurrentList
        };

        let catalog_names: Vec<String> = self
            .catalog
            .list_in_stock()?
            .into_iter()
            .map(|p| p.name)
            .collect();

        let prompt = build_recommendation_prompt(
            &current_names.join(", "),
            &history_names.join(", "),
            &catalog_names.join(", "),
        );

        let mut suggestions = match self.provider.generate(&prompt).await {
            Ok(response) => parse_suggestions(&response, &current_names, self.max_items),
            Err(error) => {
                warn!(%error, "provider recommendation failed, using frequency fallback");
                Vec::new()
            }
        };

        if suggestions.is_empty() {
            suggestions = self.frequency_ranked(user, &current_names)?;
            debug!(count = suggestions.len(), "frequency fallback suggestions");
        }

        Ok(Recommendations { suggestions, basis })
    }

    /// Snapshot a shopping-list entry into the purchase history.
    ///
    /// Called once per entry at list-clear time, never on every mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the history store fails.
    pub fn record_purchase(&self, entry: &ShoppingListEntry) -> Result<(), EngineError> {
        Ok(self.history.append(PurchaseRecord::from_entry(entry))?)
    }

    /// Rank all-time purchase-history names by descending occurrence count,
    /// with the same current-list exclusion, dedup, and cap as the
    /// provider path.
    fn frequency_ranked(
        &self,
        user: &UserId,
        current_names: &[String],
    ) -> Result<Vec<String>, EngineError> {
        let all_history = self.history.for_user(user)?;

        // First-seen order is preserved for equal counts by the stable sort.
        let mut counts: Vec<(String, usize)> = Vec::new();
        for record in &all_history {
            match counts
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(&record.item_name))
            {
                Some((_, count)) => *count += 1,
                None => counts.push((record.item_name.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let ranked = counts.into_iter().map(|(name, _)| name).collect::<Vec<_>>();
        Ok(filter_suggestions(ranked, current_names, self.max_items))
    }
}

/// Collect distinct names preserving first-occurrence order.
fn distinct_names<'i>(names: impl Iterator<Item = &'i str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

/// Parse a provider response into suggestions: split on commas, trim, drop
/// empties and the "none" sentinel, then apply exclusion/dedup/cap.
fn parse_suggestions(response: &str, current_names: &[String], max_items: usize) -> Vec<String> {
    let candidates = response
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("none"))
        .map(str::to_string)
        .collect::<Vec<_>>();
    filter_suggestions(candidates, current_names, max_items)
}

/// Case-insensitive current-list exclusion, dedup preserving first
/// occurrence, and cap.
fn filter_suggestions(
    candidates: Vec<String>,
    current_names: &[String],
    max_items: usize,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for candidate in candidates {
        if current_names
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&candidate))
        {
            continue;
        }
        if out.iter().any(|seen| seen.eq_ignore_ascii_case(&candidate)) {
            continue;
        }
        out.push(candidate);
        if out.len() == max_items {
            break;
        }
    }
    out
}

/// Build the constrained prompt for complementary suggestions.
fn build_recommendation_prompt(
    current_items: &str,
    user_history: &str,
    available_products: &str,
) -> String {
    format!(
        "STRICT INSTRUCTIONS: You are a smart shopping assistant. You must ONLY recommend \
         products from the provided database list.\n\n\
         Current shopping list: {current_items}\n\
         User purchase history: {user_history}\n\
         Available products in database: [{available_products}]\n\n\
         RULES:\n\
         1. ONLY suggest products that appear EXACTLY in the available products list above\n\
         2. Copy product names EXACTLY as they appear (including capitalization)\n\
         3. Suggest 4-5 diverse complementary items that go well with current list items\n\
         4. CRITICAL: Do NOT suggest items already in the current shopping list\n\
         5. Use smart food pairing and meal planning logic:\n\
            - Butter -> suggest Bread, Eggs, Jam, Honey\n\
            - Milk -> suggest Cereal, Cookies, Bread, Bananas\n\
            - Chicken -> suggest Rice, Broccoli, Onions, Garlic\n\
            - Pasta -> suggest Tomato Sauce, Cheese, Basil, Olive Oil\n\
            - Eggs -> suggest Bacon, Bread, Cheese, Spinach\n\
            - Beef -> suggest Potatoes, Carrots, Onions, Mushrooms\n\
         6. Think about complete meals, breakfast combinations, cooking needs\n\
         7. Prioritize variety - suggest items from different categories when possible\n\
         8. Return only exact product names separated by commas\n\
         9. If no suitable recommendations from database, return 'none'\n\n\
         Response (exact product names only):"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    use crate::models::CatalogProduct;
    use crate::provider::testing::StubProvider;
    use crate::store::{InMemoryCatalog, InMemoryHistory, InMemoryList, ListStore};

    fn user() -> UserId {
        UserId::new("user-1")
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::with_products(vec![
            CatalogProduct::new("Milk", "Fresh Farm", Decimal::new(499, 2), "Dairy", ""),
            CatalogProduct::new("Bread", "Wonder", Decimal::new(299, 2), "Bakery", ""),
            CatalogProduct::new("Eggs", "Happy Hen", Decimal::new(349, 2), "Dairy", ""),
        ])
    }

    fn list_with(names: &[&str]) -> InMemoryList {
        let list = InMemoryList::new();
        for name in names {
            list.insert(ShoppingListEntry::new(
                user(),
                *name,
                1,
                "Other",
                "item",
                Decimal::new(100, 2),
                "Brand",
            ))
            .expect("insert");
        }
        list
    }

    fn history_with(counts: &[(&str, usize)]) -> InMemoryHistory {
        let history = InMemoryHistory::new();
        for (name, count) in counts {
            for _ in 0..*count {
                let entry = ShoppingListEntry::new(
                    user(),
                    *name,
                    1,
                    "Other",
                    "item",
                    Decimal::new(100, 2),
                    "Brand",
                );
                history
                    .append(PurchaseRecord::from_entry(&entry))
                    .expect("append");
            }
        }
        history
    }

    #[tokio::test]
    async fn test_current_list_items_are_excluded() {
        let catalog = catalog();
        let list = list_with(&["Milk"]);
        let history = InMemoryHistory::new();
        let provider = StubProvider::responding("Milk, Bread, Eggs");
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread", "Eggs"]);
        assert_eq!(result.basis, Basis::CurrentList);
    }

    #[tokio::test]
    async fn test_duplicates_are_removed_preserving_first() {
        let catalog = catalog();
        let list = list_with(&["Milk"]);
        let history = InMemoryHistory::new();
        let provider = StubProvider::responding("Bread, bread, Eggs, BREAD");
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread", "Eggs"]);
    }

    #[tokio::test]
    async fn test_suggestions_capped_at_max() {
        let catalog = catalog();
        let list = list_with(&["Butter"]);
        let history = InMemoryHistory::new();
        let provider = StubProvider::responding("Bread, Eggs, Jam, Honey");
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 2);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread", "Eggs"]);
    }

    #[tokio::test]
    async fn test_empty_provider_response_falls_back_to_frequency() {
        let catalog = catalog();
        let list = list_with(&["Milk"]);
        let history = history_with(&[("Bread", 5), ("Eggs", 3), ("Milk", 1)]);
        let provider = StubProvider::responding("");
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread", "Eggs"]);
        assert_eq!(result.basis, Basis::CurrentList);
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_to_frequency() {
        let catalog = catalog();
        let list = InMemoryList::new();
        let history = history_with(&[("Eggs", 2), ("Bread", 4)]);
        let provider = StubProvider::failing();
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread", "Eggs"]);
        assert_eq!(result.basis, Basis::History);
    }

    #[tokio::test]
    async fn test_none_sentinel_triggers_fallback() {
        let catalog = catalog();
        let list = list_with(&["Milk"]);
        let history = history_with(&[("Bread", 2)]);
        let provider = StubProvider::responding("none");
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert_eq!(result.suggestions, vec!["Bread"]);
    }

    #[tokio::test]
    async fn test_no_data_short_circuits_without_provider() {
        let catalog = catalog();
        let list = InMemoryList::new();
        let history = InMemoryHistory::new();
        // A panicking provider would fail the test if it were called; the
        // failing stub at least proves no suggestions leak through.
        let provider = StubProvider::failing();
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let result = engine.recommend(&user()).await.expect("recommend");
        assert!(result.suggestions.is_empty());
        assert_eq!(result.basis, Basis::NoData);
    }

    #[tokio::test]
    async fn test_record_purchase_appends_snapshot() {
        let catalog = catalog();
        let list = InMemoryList::new();
        let history = InMemoryHistory::new();
        let provider = StubProvider::failing();
        let engine = RecommendationEngine::new(&catalog, &list, &history, &provider, 5);

        let entry = ShoppingListEntry::new(
            user(),
            "Bagels",
            2,
            "Bakery",
            "item",
            Decimal::new(499, 2),
            "Einstein",
        );
        engine.record_purchase(&entry).expect("record");

        let records = history.for_user(&user()).expect("history");
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().map(|r| r.item_name.as_str()), Some("Bagels"));
    }

    #[test]
    fn test_filter_suggestions_exclusion_is_case_insensitive() {
        let current = vec!["milk".to_string()];
        let filtered = filter_suggestions(
            vec!["Milk".to_string(), "Bread".to_string()],
            &current,
            5,
        );
        assert_eq!(filtered, vec!["Bread"]);
    }
}

//! Command interpreter: raw utterance text to a structured command.
//!
//! The interpreter is a total function - it never fails. It first asks the
//! text provider for a strict-JSON parse of the utterance; if the call
//! fails, the body is malformed, or the JSON does not match the expected
//! shape, the response is discarded and the deterministic [`fallback`]
//! parser runs instead. Both paths are normalized identically, so
//! downstream code sees a single contract.

pub mod fallback;

use cartwheel_core::Intent;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::provider::TextProvider;

/// A structured shopping command, produced fresh per utterance.
///
/// Transient: consumed immediately by the command pipeline, never persisted
/// or shared across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub intent: Intent,
    pub item: String,
    pub quantity: u32,
    pub unit: String,
    pub category: String,
}

impl ParsedCommand {
    /// Normalize field values to the downstream contract: quantity >= 1,
    /// trimmed item, unit default "item", category default "Other".
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.quantity = self.quantity.max(1);
        self.item = self.item.trim().to_string();
        if self.unit.trim().is_empty() {
            self.unit = "item".to_string();
        }
        if self.category.trim().is_empty() {
            self.category = "Other".to_string();
        }
        self
    }
}

/// Maps raw utterance text to a [`ParsedCommand`].
pub struct CommandInterpreter<'a, P> {
    provider: &'a P,
}

impl<'a, P: TextProvider> CommandInterpreter<'a, P> {
    /// Create a new interpreter over the given provider.
    #[must_use]
    pub const fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Interpret an utterance. Never fails; always returns a best-effort
    /// command.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn interpret(&self, text: &str) -> ParsedCommand {
        match self.provider.generate(&build_parse_prompt(text)).await {
            Ok(response) => match parse_provider_response(&response) {
                Ok(command) => {
                    debug!(intent = %command.intent, item = %command.item, "provider parse accepted");
                    command.normalized()
                }
                Err(reason) => {
                    warn!(%reason, "provider parse rejected, using fallback parser");
                    fallback::parse(text).normalized()
                }
            },
            Err(error) => {
                warn!(%error, "provider call failed, using fallback parser");
                fallback::parse(text).normalized()
            }
        }
    }
}

/// Build the constrained instruction prompt for utterance parsing.
fn build_parse_prompt(text: &str) -> String {
    format!(
        "You are a shopping assistant. Parse voice commands and respond with ONLY valid JSON. \
         Format: {{\"intent\":\"add\", \"item\":\"milk\", \"quantity\":2, \"unit\":\"bottles\", \"category\":\"Dairy\"}} \
         Rules: \
         1. Extract the actual food/product name, not containers \
         2. 'add 2 bottles of milk' -> item='milk', quantity=2, unit='bottles' \
         3. 'add bread' -> item='bread', quantity=1, unit='item' \
         4. 'remove milk' -> intent='remove', item='milk' \
         5. Intents: add, remove, update, search, list \
         6. Categories: Dairy, Meat, Vegetables, Fruits, Bakery, Beverages, Snacks, Other \
         7. Return ONLY the JSON object, no markdown, no explanation.\
         \n\nProcess this shopping command: \"{text}\""
    )
}

/// Parse a provider response into a command, rejecting anything that does
/// not match the expected strict JSON shape.
fn parse_provider_response(response: &str) -> Result<ParsedCommand, String> {
    let cleaned = strip_markdown_fences(response);
    if !cleaned.starts_with('{') || !cleaned.ends_with('}') {
        return Err("response is not a JSON object".to_string());
    }

    let raw: RawParse =
        serde_json::from_str(cleaned).map_err(|e| format!("unexpected JSON shape: {e}"))?;

    if raw.item.trim().is_empty() {
        return Err("missing item name".to_string());
    }

    Ok(ParsedCommand {
        intent: raw.intent,
        item: raw.item,
        quantity: raw.quantity,
        unit: raw.unit,
        category: raw.category,
    })
}

/// Drop ```json fences the provider sometimes wraps around its output.
fn strip_markdown_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// The strict JSON shape the provider is instructed to return.
#[derive(Debug, Deserialize)]
struct RawParse {
    intent: Intent,
    item: String,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    category: String,
}

const fn default_quantity() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::provider::testing::StubProvider;

    #[test]
    fn test_parse_provider_response_strict_json() {
        let command = parse_provider_response(
            r#"{"intent":"add","item":"milk","quantity":2,"unit":"bottles","category":"Dairy"}"#,
        )
        .expect("parse");
        assert_eq!(command.intent, Intent::Add);
        assert_eq!(command.item, "milk");
        assert_eq!(command.quantity, 2);
        assert_eq!(command.unit, "bottles");
    }

    #[test]
    fn test_parse_provider_response_strips_fences() {
        let command = parse_provider_response(
            "```json\n{\"intent\":\"remove\",\"item\":\"bread\"}\n```",
        )
        .expect("parse");
        assert_eq!(command.intent, Intent::Remove);
        assert_eq!(command.item, "bread");
        assert_eq!(command.quantity, 1);
    }

    #[test]
    fn test_parse_provider_response_rejects_unknown_intent() {
        let result = parse_provider_response(r#"{"intent":"purchase","item":"milk"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_provider_response_rejects_prose() {
        let result = parse_provider_response("Sure! I added milk to your list.");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_provider_response_rejects_empty_item() {
        let result = parse_provider_response(r#"{"intent":"add","item":"  "}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_normalized_applies_defaults() {
        let command = ParsedCommand {
            intent: Intent::Add,
            item: "  milk  ".to_string(),
            quantity: 0,
            unit: String::new(),
            category: String::new(),
        }
        .normalized();
        assert_eq!(command.item, "milk");
        assert_eq!(command.quantity, 1);
        assert_eq!(command.unit, "item");
        assert_eq!(command.category, "Other");
    }

    #[tokio::test]
    async fn test_interpret_prefers_provider_parse() {
        let provider = StubProvider::responding(
            r#"{"intent":"add","item":"milk","quantity":2,"unit":"bottles","category":"Dairy"}"#,
        );
        let interpreter = CommandInterpreter::new(&provider);
        let command = interpreter.interpret("add 2 bottles of milk").await;
        assert_eq!(command.category, "Dairy");
        assert_eq!(command.unit, "bottles");
    }

    #[tokio::test]
    async fn test_interpret_falls_back_on_provider_failure() {
        let provider = StubProvider::failing();
        let interpreter = CommandInterpreter::new(&provider);
        let command = interpreter.interpret("add 3 boxes of cereal").await;
        assert_eq!(command.intent, Intent::Add);
        assert_eq!(command.quantity, 3);
        assert_eq!(command.item, "cereal");
    }

    #[tokio::test]
    async fn test_interpret_falls_back_on_malformed_json() {
        let provider = StubProvider::responding("I think you want milk?");
        let interpreter = CommandInterpreter::new(&provider);
        let command = interpreter.interpret("remove milk").await;
        assert_eq!(command.intent, Intent::Remove);
        assert_eq!(command.item, "milk");
    }
}

//! Deterministic utterance parser.
//!
//! Runs whenever the text provider fails or returns an unusable parse. It is
//! a total function over arbitrary text: keyword containment for the intent,
//! the first integer token for the quantity, and a three-step heuristic for
//! the item name.

use std::sync::LazyLock;

use cartwheel_core::Intent;
use regex::Regex;

use super::ParsedCommand;

/// Sentinel item name when no candidate token survives extraction.
pub const UNKNOWN_ITEM: &str = "unknown";

/// Container words that precede the real item ("2 bottles of milk").
const CONTAINER_WORDS: &[&str] = &["bottles", "cans", "boxes", "jars", "bags", "packs"];

/// Command words that can never be the item itself.
const STOP_WORDS: &[&str] = &["add", "remove", "delete", "put", "my", "list", "to", "from"];

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("quantity regex is valid"));

/// Parse an utterance without the provider.
#[must_use]
pub fn parse(text: &str) -> ParsedCommand {
    let lower = text.trim().to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    ParsedCommand {
        intent: classify_intent(&lower),
        item: extract_item(&words),
        quantity: extract_quantity(&lower),
        unit: "item".to_string(),
        category: "Other".to_string(),
    }
}

/// Classify the intent by keyword containment; unknown verbs default to add.
///
/// The add keywords win over every other group when both occur in one
/// utterance ("I need to remove the milk" is an add).
fn classify_intent(text: &str) -> Intent {
    if text.contains("add") || text.contains("put") || text.contains("need") {
        Intent::Add
    } else if text.contains("remove") || text.contains("delete") || text.contains("take off") {
        Intent::Remove
    } else if text.contains("change") || text.contains("update") || text.contains("modify") {
        Intent::Update
    } else if text.contains("find") || text.contains("search") || text.contains("show") {
        Intent::Search
    } else {
        Intent::Add
    }
}

/// First integer token in the text, defaulting to 1.
fn extract_quantity(text: &str) -> u32 {
    QUANTITY_RE
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Extract the item name, in order of preference:
///
/// 1. the token following "of" ("2 bottles of milk" -> "milk")
/// 2. the token after a quantity digit, skipping container words
/// 3. the last token that is neither a stop word nor a container word
fn extract_item(words: &[&str]) -> String {
    if let Some(item) = item_after_of(words)
        .or_else(|| item_after_quantity(words))
        .or_else(|| last_meaningful_word(words))
    {
        item.to_string()
    } else {
        UNKNOWN_ITEM.to_string()
    }
}

fn item_after_of<'a>(words: &[&'a str]) -> Option<&'a str> {
    words
        .windows(3)
        .find(|window| window.get(1).copied() == Some("of"))
        .and_then(|window| window.get(2).copied())
}

fn item_after_quantity<'a>(words: &[&'a str]) -> Option<&'a str> {
    for (i, word) in words.iter().enumerate() {
        if !is_integer(word) {
            continue;
        }
        let candidate = words.get(i + 1)?;
        if !CONTAINER_WORDS.contains(candidate) {
            return Some(candidate);
        }
        // "2 bottles of milk" - container followed by "of"
        if words.get(i + 2).copied() == Some("of") {
            if let Some(item) = words.get(i + 3) {
                return Some(item);
            }
        }
    }
    None
}

fn last_meaningful_word<'a>(words: &[&'a str]) -> Option<&'a str> {
    words
        .iter()
        .rev()
        .find(|word| !STOP_WORDS.contains(*word) && !CONTAINER_WORDS.contains(*word))
        .copied()
}

fn is_integer(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

//! Command intent for interpreted shopping utterances.

use serde::{Deserialize, Serialize};

/// What the user asked the assistant to do.
///
/// This is a closed set matched exhaustively by the command pipeline; an
/// unrecognized intent from the text provider fails deserialization and
/// routes the utterance through the deterministic fallback parser instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Add an item to the shopping list.
    #[default]
    Add,
    /// Remove an item from the shopping list.
    Remove,
    /// Change quantity or other fields of an existing item.
    Update,
    /// Search the product catalog.
    Search,
    /// Show the current shopping list.
    List,
    /// The utterance could not be mapped to an action.
    Error,
}

impl Intent {
    /// Stable lowercase label, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Search => "search",
            Self::List => "list",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Intent::Remove).expect("serialize"),
            "\"remove\""
        );
        let parsed: Intent = serde_json::from_str("\"search\"").expect("deserialize");
        assert_eq!(parsed, Intent::Search);
    }

    #[test]
    fn test_intent_rejects_unknown_value() {
        let parsed = serde_json::from_str::<Intent>("\"purchase\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_intent_default_is_add() {
        assert_eq!(Intent::default(), Intent::Add);
    }
}

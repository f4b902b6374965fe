//! Command pipeline: one utterance in, one structured outcome out.
//!
//! Wires the interpreter, resolver, and fulfillment engine together and
//! dispatches on the closed [`Intent`] set with an exhaustive match, so a
//! new intent is a compile-time decision. Domain failures (validation,
//! unresolvable items) surface as structured outcomes with human-readable
//! messages and never leak internal detail; only store failures propagate
//! as errors.

use cartwheel_core::{Intent, UserId};
use serde::Serialize;
use tracing::instrument;

use crate::error::EngineError;
use crate::fulfillment::{AddItem, FulfillmentEngine, UpdateItem};
use crate::interpreter::fallback::UNKNOWN_ITEM;
use crate::interpreter::{CommandInterpreter, ParsedCommand};
use crate::models::{CatalogProduct, ShoppingListEntry};
use crate::provider::TextProvider;
use crate::resolver::ProductResolver;
use crate::store::{CatalogStore, HistoryStore, ListStore};

/// The result of processing one utterance.
///
/// Serialized with a `status` tag so API layers can render it directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandOutcome {
    Added {
        entry: ShoppingListEntry,
        message: String,
    },
    Removed {
        item: String,
        message: String,
    },
    Updated {
        entry: ShoppingListEntry,
        message: String,
    },
    Searched {
        products: Vec<CatalogProduct>,
        message: String,
    },
    Listed {
        entries: Vec<ShoppingListEntry>,
        count: usize,
        message: String,
    },
    NotFound {
        item: String,
        message: String,
    },
    Error {
        message: String,
    },
}

/// Runs the full utterance-to-outcome flow against a user's list.
pub struct CommandPipeline<'a, C, L, H, P> {
    catalog: &'a C,
    list: &'a L,
    history: &'a H,
    provider: &'a P,
    max_search_results: usize,
}

impl<'a, C, L, H, P> CommandPipeline<'a, C, L, H, P>
where
    C: CatalogStore,
    L: ListStore,
    H: HistoryStore,
    P: TextProvider,
{
    /// Create a new pipeline over the given stores and provider.
    ///
    /// `max_search_results` caps the product list a search outcome carries.
    #[must_use]
    pub const fn new(
        catalog: &'a C,
        list: &'a L,
        history: &'a H,
        provider: &'a P,
        max_search_results: usize,
    ) -> Self {
        Self {
            catalog,
            list,
            history,
            provider,
            max_search_results,
        }
    }

    /// Process one utterance for a user.
    ///
    /// # Errors
    ///
    /// Returns an error only if a store operation fails; every domain
    /// failure is reported as a [`CommandOutcome`] variant instead.
    #[instrument(skip(self, text), fields(user = %user, text_len = text.len()))]
    pub async fn process(&self, user: &UserId, text: &str) -> Result<CommandOutcome, EngineError> {
        if user.is_blank() {
            return Ok(CommandOutcome::Error {
                message: "A user id is required to manage a shopping list.".to_string(),
            });
        }

        let interpreter = CommandInterpreter::new(self.provider);
        let command = interpreter.interpret(text).await;

        match command.intent {
            Intent::Add => self.handle_add(user, &command).await,
            Intent::Remove => self.handle_remove(user, &command),
            Intent::Update => self.handle_update(user, &command),
            Intent::Search => self.handle_search(&command),
            Intent::List => self.handle_list(user),
            Intent::Error => Ok(Self::help_outcome()),
        }
    }

    /// Resolve the item against the catalog first, then add the resolved
    /// product so the persisted entry carries the catalog name, price, and
    /// brand.
    async fn handle_add(
        &self,
        user: &UserId,
        command: &ParsedCommand,
    ) -> Result<CommandOutcome, EngineError> {
        if command.item.is_empty() || command.item.eq_ignore_ascii_case(UNKNOWN_ITEM) {
            return Ok(CommandOutcome::Error {
                message: "I couldn't tell which item to add. Try something like 'add 2 bottles of milk'.".to_string(),
            });
        }

        let resolver = ProductResolver::new(self.catalog, self.provider);
        let candidates = resolver.resolve(&command.item).await?;
        let Some(product) = candidates.first() else {
            return Ok(Self::item_not_found(&command.item));
        };

        let request = AddItem {
            unit: Some(command.unit.clone()),
            price: Some(product.price),
            brand: Some(product.brand.clone()),
            ..AddItem::new(product.name.clone(), command.quantity, product.category.clone())
        };

        let engine = self.fulfillment();
        match engine.add_item(user, request).await {
            Ok(entry) => {
                let message = format!(
                    "Added {} x {} to your shopping list.",
                    command.quantity, entry.name
                );
                Ok(CommandOutcome::Added { entry, message })
            }
            Err(error) => Self::domain_outcome(error, &command.item),
        }
    }

    fn handle_remove(
        &self,
        user: &UserId,
        command: &ParsedCommand,
    ) -> Result<CommandOutcome, EngineError> {
        let engine = self.fulfillment();
        let Some(entry) = engine.find_item_by_name(user, &command.item)? else {
            return Ok(Self::item_not_on_list(&command.item));
        };

        match engine.remove_item(user, entry.id) {
            Ok(()) => Ok(CommandOutcome::Removed {
                message: format!("Removed {} from your shopping list.", entry.name),
                item: entry.name,
            }),
            Err(error) => Self::domain_outcome(error, &command.item),
        }
    }

    fn handle_update(
        &self,
        user: &UserId,
        command: &ParsedCommand,
    ) -> Result<CommandOutcome, EngineError> {
        let engine = self.fulfillment();
        let Some(entry) = engine.find_item_by_name(user, &command.item)? else {
            return Ok(Self::item_not_on_list(&command.item));
        };

        let update = UpdateItem {
            quantity: Some(command.quantity),
            ..UpdateItem::default()
        };
        match engine.update_item(user, entry.id, update) {
            Ok(updated) => {
                let message = format!(
                    "Updated {} quantity to {}.",
                    updated.name, updated.quantity
                );
                Ok(CommandOutcome::Updated {
                    entry: updated,
                    message,
                })
            }
            Err(error) => Self::domain_outcome(error, &command.item),
        }
    }

    fn handle_search(&self, command: &ParsedCommand) -> Result<CommandOutcome, EngineError> {
        let mut products = self.catalog.text_search(&command.item)?;
        products.truncate(self.max_search_results);
        let message = format!(
            "Found {} product(s) matching '{}'.",
            products.len(),
            command.item
        );
        Ok(CommandOutcome::Searched { products, message })
    }

    fn handle_list(&self, user: &UserId) -> Result<CommandOutcome, EngineError> {
        let entries = self.list.list(user)?;
        let count = entries.len();
        let message = format!("You have {count} item(s) on your shopping list.");
        Ok(CommandOutcome::Listed {
            entries,
            count,
            message,
        })
    }

    const fn fulfillment(&self) -> FulfillmentEngine<'a, C, L, H, P> {
        FulfillmentEngine::new(self.catalog, self.list, self.history, self.provider)
    }

    /// Map a fulfillment error to an outcome; store failures stay errors.
    fn domain_outcome(error: EngineError, item: &str) -> Result<CommandOutcome, EngineError> {
        match error {
            EngineError::Validation(message) => Ok(CommandOutcome::Error { message }),
            EngineError::NotFound(_) => Ok(Self::item_not_found(item)),
            EngineError::Store(_) => Err(error),
        }
    }

    fn item_not_found(item: &str) -> CommandOutcome {
        CommandOutcome::NotFound {
            item: item.to_string(),
            message: format!("Sorry, I couldn't find '{item}' in the catalog."),
        }
    }

    fn item_not_on_list(item: &str) -> CommandOutcome {
        CommandOutcome::NotFound {
            item: item.to_string(),
            message: format!("'{item}' is not on your shopping list."),
        }
    }

    fn help_outcome() -> CommandOutcome {
        CommandOutcome::Error {
            message: "Sorry, I didn't understand that. You can say things like 'add milk', \
                      'remove bread', 'update eggs quantity to 3', 'search for snacks', or \
                      'show my list'."
                .to_string(),
        }
    }
}

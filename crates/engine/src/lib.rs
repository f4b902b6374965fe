//! Cartwheel Engine library.
//!
//! This crate turns free-form shopping utterances into structured actions
//! against a personal shopping list, and produces complementary product
//! suggestions. The pipeline:
//!
//! 1. [`interpreter`] maps raw text to a [`interpreter::ParsedCommand`],
//!    preferring the generative text provider and falling back to
//!    deterministic parsing.
//! 2. [`pipeline`] dispatches the command to the fulfillment engine.
//! 3. [`resolver`] maps fuzzy item names to concrete catalog products,
//!    escalating to an AI-assisted lookup validated against the live catalog.
//! 4. [`recommend`] blends provider suggestions with deterministic
//!    purchase-history statistics.
//!
//! Provider output is never trusted on its own: every suggestion is
//! re-validated against the catalog, and every provider failure degrades to
//! a deterministic fallback instead of failing the request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod fulfillment;
pub mod interpreter;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod recommend;
pub mod resolver;
pub mod store;
pub mod telemetry;

pub use config::EngineConfig;
pub use error::EngineError;
pub use fulfillment::{AddItem, FulfillmentEngine, UpdateItem};
pub use interpreter::{CommandInterpreter, ParsedCommand};
pub use pipeline::{CommandOutcome, CommandPipeline};
pub use recommend::{Basis, RecommendationEngine, Recommendations};
pub use resolver::ProductResolver;

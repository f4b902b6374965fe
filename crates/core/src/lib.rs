//! Cartwheel Core - Shared types library.
//!
//! This crate provides common types used across all Cartwheel components:
//! - `engine` - Command interpretation and fulfillment pipeline
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs plus closed domain enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod intent;
pub mod priority;

pub use id::*;
pub use intent::Intent;
pub use priority::Priority;

//! Battlecry Common Types
//!
//! Shared error type and HTTP contract types for the Battlecry editor backend.

pub mod error;
pub mod types;

pub use error::{BattlecryError, Result};

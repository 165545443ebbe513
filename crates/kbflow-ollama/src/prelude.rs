//! Prelude module for convenient imports.

pub use crate::client::{OllamaClient, OllamaConfig};
pub use crate::error::{Error, Result};

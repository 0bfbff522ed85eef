//! Built-in engines
//!
//! Provider engines live in their own crates and are registered by the host
//! application next to these.

pub mod passthrough;

use crate::registry::EngineRegistry;
use std::sync::Arc;

pub use passthrough::PassthroughEngine;

/// Registry with every built-in engine
pub fn default_registry() -> EngineRegistry {
    EngineRegistry::new().with(Arc::new(PassthroughEngine))
}

//! Engine registry: name → engine implementation
//!
//! Built once at startup and read-only afterwards. Listing order is the
//! registration order.

use crate::engine::{EngineId, EngineImplementation};
use std::collections::HashMap;
use tracing::debug;

#[derive(Default, Clone)]
pub struct EngineRegistry {
    engines: Vec<(EngineId, EngineImplementation)>,
    index: HashMap<EngineId, usize>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` under its own [`engine_id`](crate::Engine::engine_id).
    ///
    /// Registering a name twice replaces the earlier engine but keeps its
    /// position in [`list`](Self::list).
    pub fn register(&mut self, engine: EngineImplementation) {
        let engine_id = engine.engine_id().to_string();
        debug!(engine = %engine_id, "Registering engine");

        match self.index.get(&engine_id) {
            Some(&position) => self.engines[position].1 = engine,
            None => {
                self.index.insert(engine_id.clone(), self.engines.len());
                self.engines.push((engine_id, engine));
            }
        }
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, engine: EngineImplementation) -> Self {
        self.register(engine);
        self
    }

    /// Remove `engine_id`, returning its implementation if it was registered
    pub fn deregister(&mut self, engine_id: &str) -> Option<EngineImplementation> {
        debug!(engine = %engine_id, "Deregistering engine");

        let position = self.index.remove(engine_id)?;
        let (_, engine) = self.engines.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(engine)
    }

    /// Resolve `engine_id` to its implementation
    pub fn get(&self, engine_id: &str) -> Option<EngineImplementation> {
        self.index
            .get(engine_id)
            .map(|&position| self.engines[position].1.clone())
    }

    pub fn contains(&self, engine_id: &str) -> bool {
        self.index.contains_key(engine_id)
    }

    /// Registered engine names, in registration order
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.list())
            .finish()
    }
}

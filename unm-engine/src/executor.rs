//! The executor façade: `list`, `search`, `retrieve`
//!
//! Owns the engine registry and nothing else; every call is independent.

use crate::engine::{EngineId, EngineImplementation};
use crate::error::{ExecutorError, ExecutorResult, UnknownEngineReason};
use crate::registry::EngineRegistry;
use crate::{retrieve, search};
use std::collections::HashSet;
use tracing::{debug, trace};
use unm_common::{Context, RetrievedSongInfo, Song, SongSearchInformation};

#[derive(Debug, Default, Clone)]
pub struct Executor {
    registry: EngineRegistry,
}

impl Executor {
    pub fn new(registry: EngineRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    /// Registered engine names, in registration order
    pub fn list(&self) -> Vec<&str> {
        self.registry.list()
    }

    /// Search `song` with `engines`, picking the winner by `ctx.search_mode`.
    ///
    /// The engine list is validated before any engine is started.
    pub async fn search<S: AsRef<str>>(
        &self,
        engines: &[S],
        song: &Song,
        ctx: &Context,
    ) -> ExecutorResult<SongSearchInformation> {
        let resolved = self.resolve_engines(engines)?;
        search::search(resolved, song, ctx).await
    }

    /// Turn a search result into a playable URL
    pub async fn retrieve(
        &self,
        info: &SongSearchInformation,
        ctx: &Context,
    ) -> ExecutorResult<RetrievedSongInfo> {
        retrieve::retrieve(&self.registry, info, ctx).await
    }

    /// Validate `engines` and resolve them to implementations, keeping order.
    ///
    /// Rejects an empty list, names that are not registered, and names
    /// requested twice. Every offending name is reported, not only the first;
    /// unregistered names take precedence over duplicates.
    fn resolve_engines<S: AsRef<str>>(
        &self,
        engines: &[S],
    ) -> ExecutorResult<Vec<(EngineId, EngineImplementation)>> {
        if engines.is_empty() {
            return Err(ExecutorError::EmptyEngineList);
        }

        let names: Vec<&str> = engines.iter().map(|engine| engine.as_ref()).collect();
        debug!("Validating if all the engines ({names:?}) are registered…");

        let mut seen = HashSet::with_capacity(names.len());
        let mut missing: Vec<String> = Vec::new();
        let mut duplicated: Vec<String> = Vec::new();
        let mut resolved = Vec::with_capacity(names.len());

        for engine_id in names {
            trace!("Validating: {engine_id}");

            if !seen.insert(engine_id) {
                if !duplicated.iter().any(|name| name == engine_id) {
                    duplicated.push(engine_id.to_string());
                }
                continue;
            }

            match self.registry.get(engine_id) {
                Some(engine) => resolved.push((engine_id.to_string(), engine)),
                None => missing.push(engine_id.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ExecutorError::UnknownEngine {
                engines: missing,
                reason: UnknownEngineReason::NotRegistered,
            });
        }
        if !duplicated.is_empty() {
            return Err(ExecutorError::UnknownEngine {
                engines: duplicated,
                reason: UnknownEngineReason::Duplicated,
            });
        }

        Ok(resolved)
    }
}

//! Retrieve orchestration: search result → playable URL

use crate::engine::EngineContext;
use crate::error::{ExecutorError, ExecutorResult};
use crate::registry::EngineRegistry;
use tracing::{debug, info, warn};
use unm_common::{Context, RetrievedSongInfo, SongSearchInformation};

/// Resolve `info` into a [`RetrievedSongInfo`].
///
/// A pre-retrieve hint is returned as-is without touching any engine.
/// Otherwise the engine named in `info.source` is asked for a fresh URL and
/// its failure is passed through unchanged.
pub(crate) async fn retrieve(
    registry: &EngineRegistry,
    info: &SongSearchInformation,
    ctx: &Context,
) -> ExecutorResult<RetrievedSongInfo> {
    if let Some(pre_retrieved) = &info.pre_retrieve_result {
        debug!(engine = %info.source, "Using the pre-retrieve result");
        return Ok(pre_retrieved.clone());
    }

    info!(engine = %info.source, "Retrieving song");

    let engine = registry
        .get(&info.source)
        .ok_or_else(|| ExecutorError::not_registered(&info.source))?;
    let engine_ctx = EngineContext::new(ctx, &info.source);

    match engine.retrieve(info, &engine_ctx).await {
        Ok(retrieved) => {
            debug!(engine = %info.source, url = %retrieved.url, "Retrieved song");
            Ok(retrieved)
        }
        Err(error) => {
            warn!(engine = %info.source, "Failed to retrieve: {}", error);
            Err(ExecutorError::Engine {
                engine: info.source.clone(),
                error,
            })
        }
    }
}

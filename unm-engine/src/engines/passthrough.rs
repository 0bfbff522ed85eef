//! `passthrough` engine
//!
//! Resolves songs whose context already carries a playable URL (for example
//! an external URI the host application knows about). No network access.
//!
//! The context key defaults to `url` and can be changed with the engine
//! setting `context_key`.

use crate::engine::{Engine, EngineContext};
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use tracing::debug;
use unm_common::{RetrievedSongInfo, Song, SongSearchInformation};

pub const ENGINE_ID: &str = "passthrough";

const DEFAULT_CONTEXT_KEY: &str = "url";

pub struct PassthroughEngine;

#[async_trait]
impl Engine for PassthroughEngine {
    fn engine_id(&self) -> &str {
        ENGINE_ID
    }

    async fn search(&self, song: &Song, ctx: &EngineContext<'_>) -> EngineResult<SongSearchInformation> {
        let key = ctx.config().get_or_default("context_key", DEFAULT_CONTEXT_KEY);

        let url = song
            .context_value(key)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(EngineError::NoMatch)?;
        debug!(song = %song, key, "Song context carries a URL");

        Ok(SongSearchInformation::new(ENGINE_ID, url)
            .with_song(song.clone())
            .with_pre_retrieve_result(RetrievedSongInfo::new(ENGINE_ID, url)))
    }

    async fn retrieve(
        &self,
        info: &SongSearchInformation,
        _ctx: &EngineContext<'_>,
    ) -> EngineResult<RetrievedSongInfo> {
        self.ensure_owned(info)?;

        if info.identifier.trim().is_empty() {
            return Err(EngineError::provider("empty identifier"));
        }

        Ok(RetrievedSongInfo::new(ENGINE_ID, info.identifier.trim()))
    }
}

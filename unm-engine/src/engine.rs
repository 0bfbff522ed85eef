//! The engine capability contract
//!
//! An engine is one music provider. The core invokes engines by name and
//! only through this trait; everything provider-specific (network calls,
//! authentication, parsing) lives behind it.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use unm_common::{Context, EngineConfig, RetrievedSongInfo, SearchMode, Song, SongSearchInformation};

/// Engine identifier, e.g. `"bilibili"`
pub type EngineId = String;

/// Shared engine implementation as stored in the registry
pub type EngineImplementation = Arc<dyn Engine>;

/// Engine trait - every provider implements this
#[async_trait]
pub trait Engine: Send + Sync {
    /// The name this engine registers under and stamps into `source`
    fn engine_id(&self) -> &str;

    /// Search a track matching `song`.
    ///
    /// # Returns
    /// * `Ok(SongSearchInformation)` - `source` must be [`engine_id`](Self::engine_id)
    /// * `Err(EngineError::NoMatch)` - the provider has no candidate
    /// * `Err(_)` - provider or timeout failure (recorded, does not abort the search)
    async fn search(&self, song: &Song, ctx: &EngineContext<'_>) -> EngineResult<SongSearchInformation>;

    /// Resolve a current playable URL for a result this engine produced.
    ///
    /// Implementations should call [`ensure_owned`](Self::ensure_owned) first.
    async fn retrieve(
        &self,
        info: &SongSearchInformation,
        ctx: &EngineContext<'_>,
    ) -> EngineResult<RetrievedSongInfo>;

    /// Reject search results produced by another engine
    fn ensure_owned(&self, info: &SongSearchInformation) -> EngineResult<()> {
        if info.source == self.engine_id() {
            Ok(())
        } else {
            Err(EngineError::SourceMismatch {
                engine: self.engine_id().to_string(),
                found: info.source.clone(),
            })
        }
    }
}

/// What one engine sees of the call context.
///
/// Borrows the caller's read-only [`Context`]; the configuration view is
/// restricted to the engine's own settings. During a search it also carries
/// the call's cancellation signal.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    context: &'a Context,
    config: EngineConfig<'a>,
    cancellation: Option<&'a CancellationToken>,
}

impl<'a> EngineContext<'a> {
    pub fn new(context: &'a Context, engine: &'a str) -> Self {
        Self {
            context,
            config: context.engine_config(engine),
            cancellation: None,
        }
    }

    pub(crate) fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// True once another engine has won the search.
    ///
    /// Advisory: engines doing long work outside an `.await` (child
    /// processes, blocking pools) should check this and stop early.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_some_and(CancellationToken::is_cancelled)
    }

    pub fn proxy_uri(&self) -> Option<&'a str> {
        self.context.proxy_uri.as_deref()
    }

    pub fn enable_flac(&self) -> bool {
        self.context.enable_flac
    }

    pub fn search_mode(&self) -> SearchMode {
        self.context.search_mode
    }

    /// This engine's settings
    pub fn config(&self) -> EngineConfig<'a> {
        self.config
    }

    /// Proxy for `reqwest` clients, built from `proxy_uri`
    pub fn proxy(&self) -> EngineResult<Option<reqwest::Proxy>> {
        self.proxy_uri()
            .map(reqwest::Proxy::all)
            .transpose()
            .map_err(EngineError::from)
    }
}

/// Run `future` under an engine-level deadline.
///
/// The core applies no deadline of its own; engines that talk to slow
/// providers wrap their work with this.
pub async fn with_deadline<T, F>(after: Duration, future: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(after, future).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout { after }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyEngine;

    #[async_trait]
    impl Engine for DummyEngine {
        fn engine_id(&self) -> &str {
            "dummy"
        }

        async fn search(&self, _song: &Song, _ctx: &EngineContext<'_>) -> EngineResult<SongSearchInformation> {
            Err(EngineError::NoMatch)
        }

        async fn retrieve(
            &self,
            info: &SongSearchInformation,
            _ctx: &EngineContext<'_>,
        ) -> EngineResult<RetrievedSongInfo> {
            self.ensure_owned(info)?;
            Ok(RetrievedSongInfo::new("dummy", format!("https://dummy/{}", info.identifier)))
        }
    }

    #[tokio::test]
    async fn test_retrieve_rejects_foreign_result() {
        let ctx = Context::default();
        let engine_ctx = EngineContext::new(&ctx, "dummy");

        let foreign = SongSearchInformation::new("kugou", "123");
        let err = DummyEngine.retrieve(&foreign, &engine_ctx).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::SourceMismatch { ref engine, ref found } if engine == "dummy" && found == "kugou"
        ));

        let own = SongSearchInformation::new("dummy", "123");
        let retrieved = DummyEngine.retrieve(&own, &engine_ctx).await.unwrap();
        assert_eq!(retrieved.url, "https://dummy/123");
    }

    #[test]
    fn test_engine_context_hides_other_engines_config() {
        let mut ctx = Context {
            proxy_uri: Some("http://127.0.0.1:7890".to_string()),
            enable_flac: true,
            search_mode: SearchMode::OrderFirst,
            ..Default::default()
        };
        ctx.set_engine_config("dummy", "quality", "high");
        ctx.set_engine_config("other", "token", "secret");

        let engine_ctx = EngineContext::new(&ctx, "dummy");
        assert_eq!(engine_ctx.config().get("quality"), Some("high"));
        assert_eq!(engine_ctx.config().get("token"), None);
        assert!(engine_ctx.enable_flac());
        assert_eq!(engine_ctx.search_mode(), SearchMode::OrderFirst);
        assert!(engine_ctx.proxy().unwrap().is_some());
    }

    #[test]
    fn test_engine_context_rejects_bad_proxy() {
        let ctx = Context {
            proxy_uri: Some("http://[::1".to_string()),
            ..Default::default()
        };
        let engine_ctx = EngineContext::new(&ctx, "dummy");
        assert!(matches!(engine_ctx.proxy(), Err(EngineError::Provider(_))));
    }

    #[tokio::test]
    async fn test_with_deadline_maps_elapsed_to_timeout() {
        let result: EngineResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(EngineError::Timeout { .. })));

        let result = with_deadline(Duration::from_secs(5), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}

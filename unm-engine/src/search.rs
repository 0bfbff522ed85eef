//! Search orchestration: fan one song out to N engines, commit one winner
//!
//! Every requested engine runs as its own spawned task and reports into a
//! one-shot result slot at its request position. Winner selection only
//! reads the slots:
//! - [`SearchMode::FastFirst`]: slots are polled in completion order and
//!   the first success wins.
//! - [`SearchMode::OrderFirst`]: slots are awaited in request order, so a
//!   later position that finished early waits in its slot until every
//!   earlier position has failed.
//!
//! Once a winner is committed the call's [`CancellationToken`] fires. Tasks
//! still running drop their engine future at its next suspension point and
//! their outcome is never read. The orchestrator does not wait for that to
//! happen before returning.

use crate::engine::{EngineContext, EngineId, EngineImplementation};
use crate::error::{EngineError, EngineResult, ExecutorError, ExecutorResult, FailureReport};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use unm_common::{Context, SearchMode, Song, SongSearchInformation};

/// The outcome one engine task reports
type Outcome = EngineResult<SongSearchInformation>;

/// Result slot of one request position
struct Slot {
    engine: EngineId,
    receiver: oneshot::Receiver<Outcome>,
}

impl Slot {
    /// Wait for this position to resolve.
    ///
    /// A task that ended without reporting (it panicked) counts as a
    /// provider failure of that engine.
    async fn resolve(self) -> (EngineId, Outcome) {
        let outcome = self.receiver.await.unwrap_or_else(|_| {
            Err(EngineError::provider("engine task ended without reporting a result"))
        });
        (self.engine, outcome)
    }
}

/// Run `engines` (already validated, in request order) for `song`.
pub(crate) async fn search(
    engines: Vec<(EngineId, EngineImplementation)>,
    song: &Song,
    ctx: &Context,
) -> ExecutorResult<SongSearchInformation> {
    let mode = ctx.search_mode;
    let requested: Vec<EngineId> = engines.iter().map(|(id, _)| id.clone()).collect();
    info!(song = %song, engines = ?requested, ?mode, "Searching");

    let cancel_token = CancellationToken::new();
    // Engine tasks must not outlive this call, even if the caller drops it.
    let _cancel_on_drop = cancel_token.clone().drop_guard();

    let song = Arc::new(song.clone());
    let ctx = Arc::new(ctx.clone());
    let started = Instant::now();

    let slots: Vec<Slot> = engines
        .into_iter()
        .map(|(engine_id, engine)| {
            launch(engine_id, engine, Arc::clone(&song), Arc::clone(&ctx), cancel_token.clone())
        })
        .collect();

    let selected = match mode {
        SearchMode::FastFirst => fast_first(slots).await,
        SearchMode::OrderFirst => order_first(slots).await,
    };

    // Winner committed or every engine exhausted: stop whatever is left.
    cancel_token.cancel();

    match selected {
        Ok(result) => {
            info!(
                song = %song,
                engine = %result.source,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Found song"
            );
            Ok(result)
        }
        Err(mut report) => {
            report.sort_by_request_order(&requested);
            warn!(song = %song, failures = %report, "All engines failed");
            Err(ExecutorError::AllEnginesFailed(report))
        }
    }
}

/// Spawn one engine invocation and hand back its result slot
fn launch(
    engine_id: EngineId,
    engine: EngineImplementation,
    song: Arc<Song>,
    ctx: Arc<Context>,
    cancel_token: CancellationToken,
) -> Slot {
    let (sender, receiver) = oneshot::channel();
    let task_engine_id = engine_id.clone();

    tokio::spawn(async move {
        let engine_ctx = EngineContext::new(&ctx, &task_engine_id).with_cancellation(&cancel_token);
        debug!(engine = %task_engine_id, "Engine search started");

        let outcome = tokio::select! {
            _ = cancel_token.cancelled() => {
                trace!(engine = %task_engine_id, "Engine search cancelled");
                return;
            }
            outcome = engine.search(&song, &engine_ctx) => outcome,
        };

        let outcome = outcome.and_then(|result| {
            if result.source == task_engine_id {
                Ok(result)
            } else {
                Err(EngineError::SourceMismatch {
                    engine: task_engine_id.clone(),
                    found: result.source,
                })
            }
        });

        // The receiver is gone once a winner has been committed elsewhere.
        if sender.send(outcome).is_err() {
            trace!(engine = %task_engine_id, "Engine result discarded");
        }
    });

    Slot { engine: engine_id, receiver }
}

/// First slot to resolve successfully wins, whatever its position
async fn fast_first(slots: Vec<Slot>) -> Result<SongSearchInformation, FailureReport> {
    let mut pending: FuturesUnordered<_> = slots.into_iter().map(Slot::resolve).collect();
    let mut report = FailureReport::new();

    while let Some((engine, outcome)) = pending.next().await {
        match outcome {
            Ok(result) => {
                debug!(engine = %engine, remaining = pending.len(), "Fast-first winner committed");
                return Ok(result);
            }
            Err(e) => {
                debug!(engine = %engine, "Engine failed: {}", e);
                report.push(engine, e);
            }
        }
    }

    Err(report)
}

/// Earliest position that succeeds wins; later positions wait their turn
async fn order_first(slots: Vec<Slot>) -> Result<SongSearchInformation, FailureReport> {
    let mut report = FailureReport::new();

    for (position, slot) in slots.into_iter().enumerate() {
        let (engine, outcome) = slot.resolve().await;
        match outcome {
            Ok(result) => {
                debug!(engine = %engine, position, "Order-first winner committed");
                return Ok(result);
            }
            Err(e) => {
                debug!(engine = %engine, position, "Engine failed: {}", e);
                report.push(engine, e);
            }
        }
    }

    Err(report)
}

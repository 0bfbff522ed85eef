//! # UNM Engine
//!
//! Resolves a song into a playable audio URL by asking several independent
//! source engines and combining their answers:
//! - [`Engine`]: the capability every provider implements
//! - [`EngineRegistry`]: name → engine, built at startup
//! - [`Executor`]: `list`, `search` (concurrent fan-out under a
//!   [`SearchMode`](unm_common::SearchMode)) and `retrieve`
//!
//! ```ignore
//! let executor = Executor::new(unm_engine::engines::default_registry());
//! let found = executor.search(&["passthrough"], &song, &ctx).await?;
//! let audio = executor.retrieve(&found, &ctx).await?;
//! ```

pub mod engine;
pub mod engines;
pub mod error;
pub mod executor;
pub mod registry;
mod retrieve;
mod search;

pub use engine::{with_deadline, Engine, EngineContext, EngineId, EngineImplementation};
pub use error::{
    EngineError, EngineErrorKind, EngineResult, ExecutorError, ExecutorResult, FailureReport,
    FailureSummary, UnknownEngineReason,
};
pub use executor::Executor;
pub use registry::EngineRegistry;

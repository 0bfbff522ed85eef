//! Error types for the engine core
//!
//! Two layers:
//! - [`EngineError`]: why one engine failed. Recovered locally by the
//!   search orchestrator and only surfaced through [`FailureReport`].
//! - [`ExecutorError`]: what the caller of `search`/`retrieve` sees.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single engine invocation
#[derive(Debug, Error)]
pub enum EngineError {
    /// The provider has no candidate for the song
    #[error("No matched song")]
    NoMatch,

    /// Transport or parsing failure inside the provider
    #[error("Provider error: {0}")]
    Provider(#[from] anyhow::Error),

    /// The engine exceeded its own deadline
    #[error("Timed out after {after:?}")]
    Timeout { after: Duration },

    /// `retrieve` was handed a result produced by another engine
    #[error("Engine {engine} cannot retrieve results from {found}")]
    SourceMismatch { engine: String, found: String },
}

impl EngineError {
    /// Provider failure from a plain message
    pub fn provider(message: impl fmt::Display) -> Self {
        EngineError::Provider(anyhow::anyhow!("{message}"))
    }

    pub fn kind(&self) -> EngineErrorKind {
        match self {
            EngineError::NoMatch => EngineErrorKind::NoMatch,
            EngineError::Provider(_) => EngineErrorKind::Provider,
            EngineError::Timeout { .. } => EngineErrorKind::Timeout,
            EngineError::SourceMismatch { .. } => EngineErrorKind::SourceMismatch,
        }
    }
}

impl From<unm_common::Error> for EngineError {
    fn from(err: unm_common::Error) -> Self {
        EngineError::Provider(err.into())
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Provider(err.into())
    }
}

/// Discriminant of [`EngineError`], for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    NoMatch,
    Provider,
    Timeout,
    SourceMismatch,
}

/// Result type of engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Per-engine failure reasons of a search, in request order
#[derive(Debug, Default)]
pub struct FailureReport {
    failures: Vec<(String, EngineError)>,
}

/// Serializable view of one [`FailureReport`] entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureSummary {
    pub engine: String,
    pub kind: EngineErrorKind,
    pub message: String,
}

impl FailureReport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, engine: impl Into<String>, error: EngineError) {
        self.failures.push((engine.into(), error));
    }

    /// Put entries back into the order engines were requested in
    pub(crate) fn sort_by_request_order(&mut self, requested: &[String]) {
        self.failures.sort_by_key(|(engine, _)| {
            requested
                .iter()
                .position(|name| name == engine)
                .unwrap_or(usize::MAX)
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure reason of `engine`, if it failed
    pub fn get(&self, engine: &str) -> Option<&EngineError> {
        self.failures
            .iter()
            .find(|(name, _)| name == engine)
            .map(|(_, error)| error)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EngineError)> {
        self.failures
            .iter()
            .map(|(engine, error)| (engine.as_str(), error))
    }

    pub fn engines(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|(engine, _)| engine.as_str())
    }

    /// True when every engine simply had nothing to offer
    pub fn all_no_match(&self) -> bool {
        !self.is_empty()
            && self
                .failures
                .iter()
                .all(|(_, error)| matches!(error, EngineError::NoMatch))
    }

    pub fn summaries(&self) -> Vec<FailureSummary> {
        self.failures
            .iter()
            .map(|(engine, error)| FailureSummary {
                engine: engine.clone(),
                kind: error.kind(),
                message: error.to_string(),
            })
            .collect()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (engine, error)) in self.failures.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{engine}: {error}")?;
        }
        Ok(())
    }
}

/// Why an engine name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownEngineReason {
    NotRegistered,
    Duplicated,
}

impl fmt::Display for UnknownEngineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownEngineReason::NotRegistered => f.write_str("not registered"),
            UnknownEngineReason::Duplicated => f.write_str("requested more than once"),
        }
    }
}

/// Caller-visible failure of `search` or `retrieve`
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Requested or referenced engines that are not usable, in request order
    #[error("{}", unknown_engine_message(.engines, .reason))]
    UnknownEngine {
        engines: Vec<String>,
        reason: UnknownEngineReason,
    },

    /// `search` was called without engines
    #[error("No engine was requested")]
    EmptyEngineList,

    /// Every requested engine failed
    #[error("All engines failed: {0}")]
    AllEnginesFailed(FailureReport),

    /// The engine owning a search result failed to retrieve it
    #[error("Engine {engine} failed: {error}")]
    Engine {
        engine: String,
        #[source]
        error: EngineError,
    },
}

impl ExecutorError {
    pub(crate) fn not_registered(engine: impl Into<String>) -> Self {
        ExecutorError::UnknownEngine {
            engines: vec![engine.into()],
            reason: UnknownEngineReason::NotRegistered,
        }
    }
}

fn unknown_engine_message(engines: &[String], reason: &UnknownEngineReason) -> String {
    match engines {
        [engine] => format!("Engine {engine} is {reason}"),
        _ => format!("Engines {} are {reason}", engines.join(", ")),
    }
}

/// Result type of executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

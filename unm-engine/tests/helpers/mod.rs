//! Scripted engines for orchestration tests
//!
//! Each engine sleeps for a configured latency, then answers with a
//! configured outcome. Counters and flags let tests observe what the
//! orchestrator did with it.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use unm_common::{Artist, RetrievedSongInfo, Song, SongSearchInformation};
use unm_engine::{Engine, EngineContext, EngineError, EngineImplementation, EngineResult};

/// How a scripted search ends
#[derive(Debug, Clone)]
pub enum SearchScript {
    Succeed,
    /// Succeed with a pre-retrieve hint attached
    SucceedWithHint,
    Fail(Failure),
    /// Never resolves
    Hang,
    /// Succeed but stamp another engine's name into `source`
    WrongSource(String),
    /// Succeed with the value of this engine setting as identifier
    EchoConfig(String),
    Panic,
}

/// How a scripted retrieve ends
#[derive(Debug, Clone)]
pub enum RetrieveScript {
    Url,
    Fail(Failure),
    /// Calling retrieve is a test failure
    Forbidden,
}

#[derive(Debug, Clone, Copy)]
pub enum Failure {
    NoMatch,
    Provider,
    Timeout,
}

impl Failure {
    fn to_error(self) -> EngineError {
        match self {
            Failure::NoMatch => EngineError::NoMatch,
            Failure::Provider => EngineError::provider("HTTP 503 Service Unavailable"),
            Failure::Timeout => EngineError::Timeout {
                after: Duration::from_secs(10),
            },
        }
    }
}

pub struct ScriptedEngine {
    id: String,
    latency: Duration,
    search: SearchScript,
    retrieve: RetrieveScript,
    search_calls: AtomicUsize,
    retrieve_calls: AtomicUsize,
    search_completed: AtomicBool,
    search_cancelled: Arc<AtomicBool>,
}

impl ScriptedEngine {
    pub fn new(id: &str, search: SearchScript) -> Self {
        Self {
            id: id.to_string(),
            latency: Duration::ZERO,
            search,
            retrieve: RetrieveScript::Url,
            search_calls: AtomicUsize::new(0),
            retrieve_calls: AtomicUsize::new(0),
            search_completed: AtomicBool::new(false),
            search_cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn succeeding(id: &str) -> Self {
        Self::new(id, SearchScript::Succeed)
    }

    pub fn failing(id: &str, failure: Failure) -> Self {
        Self::new(id, SearchScript::Fail(failure))
    }

    pub fn hanging(id: &str) -> Self {
        Self::new(id, SearchScript::Hang)
    }

    pub fn after_ms(mut self, millis: u64) -> Self {
        self.latency = Duration::from_millis(millis);
        self
    }

    pub fn retrieving(mut self, script: RetrieveScript) -> Self {
        self.retrieve = script;
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    /// The search ran to the end of its script
    pub fn search_completed(&self) -> bool {
        self.search_completed.load(Ordering::SeqCst)
    }

    /// The search future was dropped before finishing
    pub fn search_cancelled(&self) -> bool {
        self.search_cancelled.load(Ordering::SeqCst)
    }

    pub fn identifier(&self) -> String {
        format!("{}-track", self.id)
    }

    pub fn url_for(&self, identifier: &str) -> String {
        format!("https://{}.example/{}", self.id, identifier)
    }
}

/// Sets the flag when dropped while still armed
struct InFlight {
    cancelled: Arc<AtomicBool>,
    armed: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if self.armed {
            self.cancelled.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn engine_id(&self) -> &str {
        &self.id
    }

    async fn search(&self, _song: &Song, ctx: &EngineContext<'_>) -> EngineResult<SongSearchInformation> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let mut in_flight = InFlight {
            cancelled: Arc::clone(&self.search_cancelled),
            armed: true,
        };

        tokio::time::sleep(self.latency).await;

        let outcome = match &self.search {
            SearchScript::Succeed => Ok(SongSearchInformation::new(&self.id, self.identifier())),
            SearchScript::SucceedWithHint => {
                let identifier = self.identifier();
                let hint = RetrievedSongInfo::new(&self.id, self.url_for(&identifier));
                Ok(SongSearchInformation::new(&self.id, identifier).with_pre_retrieve_result(hint))
            }
            SearchScript::Fail(failure) => Err(failure.to_error()),
            SearchScript::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending never resolves")
            }
            SearchScript::WrongSource(source) => {
                Ok(SongSearchInformation::new(source, self.identifier()))
            }
            SearchScript::EchoConfig(key) => match ctx.config().get(key) {
                Some(value) => Ok(SongSearchInformation::new(&self.id, value)),
                None => Err(EngineError::NoMatch),
            },
            SearchScript::Panic => panic!("scripted engine {} panicked", self.id),
        };

        in_flight.armed = false;
        self.search_completed.store(true, Ordering::SeqCst);
        outcome
    }

    async fn retrieve(
        &self,
        info: &SongSearchInformation,
        _ctx: &EngineContext<'_>,
    ) -> EngineResult<RetrievedSongInfo> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        self.ensure_owned(info)?;

        match &self.retrieve {
            RetrieveScript::Url => Ok(RetrievedSongInfo::new(&self.id, self.url_for(&info.identifier))),
            RetrieveScript::Fail(failure) => Err(failure.to_error()),
            RetrieveScript::Forbidden => panic!("retrieve must not reach engine {}", self.id),
        }
    }
}

/// Upcast for registration while the test keeps the concrete handle
pub fn as_engine(engine: &Arc<ScriptedEngine>) -> EngineImplementation {
    Arc::clone(engine) as EngineImplementation
}

pub fn test_song() -> Song {
    Song {
        id: "185811".to_string(),
        name: "青花瓷".to_string(),
        artists: vec![Artist {
            id: "6452".to_string(),
            name: "周杰伦".to_string(),
        }],
        ..Default::default()
    }
}

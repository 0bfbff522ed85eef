//! Per-call context handed (read-only) to every engine

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How the winner is picked when several engines run concurrently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Return the first successful response.
    ///
    /// For `["a", "b", "c"]` where `"c"` answers first, `"c"` wins.
    #[default]
    #[serde(alias = "FastFirst")]
    FastFirst,
    /// Return according to the order of the requested engines.
    ///
    /// For `["a", "b", "c"]`, even if `"c"` answers first we still wait
    /// for `"a"`; only when `"a"` has no result do we consider `"b"`.
    #[serde(alias = "OrderFirst")]
    OrderFirst,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::FastFirst => write!(f, "fast_first"),
            SearchMode::OrderFirst => write!(f, "order_first"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fast_first" | "fastfirst" => Ok(SearchMode::FastFirst),
            "order_first" | "orderfirst" => Ok(SearchMode::OrderFirst),
            other => Err(Error::Config(format!("Unknown search mode: {other}"))),
        }
    }
}

/// Configuration values of one engine: key → value.
pub type EngineSettings = HashMap<String, String>;

/// The per-call context.
///
/// Built by the caller for each call and never mutated by the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    /// The proxy URI engines should send their requests through.
    pub proxy_uri: Option<String>,
    /// Whether engines may return FLAC audio.
    pub enable_flac: bool,
    /// The winner selection policy of a search.
    pub search_mode: SearchMode,
    /// Engine name → that engine's opaque settings.
    pub config: HashMap<String, EngineSettings>,
}

impl Context {
    /// The settings visible to `engine`. Other engines' settings stay hidden.
    pub fn engine_config<'a>(&'a self, engine: &'a str) -> EngineConfig<'a> {
        EngineConfig {
            engine,
            values: self.config.get(engine),
        }
    }

    /// Set one configuration value for `engine`.
    pub fn set_engine_config(
        &mut self,
        engine: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.config
            .entry(engine.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Layer `overrides` on top of this context's engine settings, key by key.
    pub fn merge_engine_config(&mut self, overrides: HashMap<String, EngineSettings>) {
        for (engine, settings) in overrides {
            self.config.entry(engine).or_default().extend(settings);
        }
    }
}

/// Read-only view over a single engine's settings.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig<'a> {
    engine: &'a str,
    values: Option<&'a EngineSettings>,
}

impl<'a> EngineConfig<'a> {
    /// The engine this view belongs to.
    pub fn engine(&self) -> &'a str {
        self.engine
    }

    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.values
            .and_then(|values| values.get(key))
            .map(String::as_str)
    }

    pub fn get_or_default(&self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Like [`get`](Self::get), but a missing key is an error explaining
    /// what the value is needed for.
    pub fn get_or_err(&self, key: &str, purpose: &str) -> Result<&'a str> {
        self.get(key).ok_or_else(|| Error::MissingEngineConfig {
            engine: self.engine.to_string(),
            key: key.to_string(),
            purpose: purpose.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.map_or(true, |values| values.is_empty())
    }
}

//! # UNM Common Library
//!
//! Shared code for the UNM resolver crates including:
//! - Song metadata and search/retrieve result types
//! - The per-call `Context` and `SearchMode`
//! - Per-engine configuration views
//! - TOML configuration loading

pub mod config;
pub mod context;
pub mod error;
pub mod song;

pub use context::{Context, EngineConfig, EngineSettings, SearchMode};
pub use error::{Error, Result};
pub use song::{Album, Artist, RetrievedSongInfo, SerializedIdentifier, Song, SongSearchInformation};

//! Song metadata and the values produced by engines
//!
//! A [`Song`] is the immutable input of a search. Engines answer with a
//! [`SongSearchInformation`], which the retrieve step later turns into a
//! [`RetrievedSongInfo`] carrying the playable URL.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Engine-private identifier passed back to the same engine's `retrieve()`.
///
/// Opaque outside the engine that produced it.
pub type SerializedIdentifier = String;

/// The metadata of the artist of a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// The identifier of this artist.
    #[serde(default)]
    pub id: String,
    /// The name of this artist.
    pub name: String,
}

/// The metadata of the album of a song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// The identifier of this album.
    #[serde(default)]
    pub id: String,
    /// The name of this album.
    pub name: String,
}

/// The metadata of a song.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// The identifier of this song.
    #[serde(default)]
    pub id: String,
    /// The name of this song.
    pub name: String,
    /// The duration of this song, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// The artists of this song, in credit order.
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// The album of this song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<Album>,
    /// Free-form values carried through to engines untouched,
    /// for example the external URI of this song.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<HashMap<String, String>>,
}

impl Song {
    /// Search keyword: `{name} - {artist 1}, {artist 2}`.
    ///
    /// Songs without artists produce just the name.
    pub fn keyword(&self) -> String {
        if self.artists.is_empty() {
            return self.name.clone();
        }

        let artists = self
            .artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!("{} - {}", self.name, artists)
    }

    /// Look up a value in the song's context map.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|context| context.get(key))
            .map(String::as_str)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword())
    }
}

/// A successful engine match.
///
/// Produced by exactly one engine; `source` names that engine so the
/// retrieve step can route back to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSearchInformation {
    /// The engine that produced this result, for example `bilibili`.
    pub source: String,
    /// The serialized identifier of this song, meaningful only to `source`.
    pub identifier: SerializedIdentifier,
    /// The song as the engine resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<Song>,
    /// URL obtained while searching; lets `retrieve()` skip the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_retrieve_result: Option<RetrievedSongInfo>,
}

impl SongSearchInformation {
    /// Search result without resolved metadata or retrieval hint.
    pub fn new(source: impl Into<String>, identifier: impl Into<SerializedIdentifier>) -> Self {
        Self {
            source: source.into(),
            identifier: identifier.into(),
            song: None,
            pre_retrieve_result: None,
        }
    }

    /// Attach the song metadata the engine resolved.
    pub fn with_song(mut self, song: Song) -> Self {
        self.song = Some(song);
        self
    }

    /// Attach a retrieval result obtained during search.
    pub fn with_pre_retrieve_result(mut self, retrieved: RetrievedSongInfo) -> Self {
        self.pre_retrieve_result = Some(retrieved);
        self
    }
}

/// The information of the song retrieved with `retrieve()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedSongInfo {
    /// The engine that resolved this URL, for example `bilibili`.
    pub source: String,
    /// The playable URL of this song.
    pub url: String,
}

impl RetrievedSongInfo {
    pub fn new(source: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: url.into(),
        }
    }
}

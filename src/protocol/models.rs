use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::playback::TrackRef;

/// A playlist selected for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub uri: String,
    pub name: String,
}

/// Why a track is in the queue: which playlist, or which user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Playlist,
    User,
}

/// Immutable view of the session for display and API use.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub started: bool,
    /// Epoch milliseconds; `None` when no session is active.
    pub start_time: Option<u64>,
    pub skip_threshold: u32,
    pub playlists: Vec<Playlist>,
    pub played_tracks: Vec<String>,
    pub remaining_playlist_tracks: Vec<String>,
    pub track_sources: HashMap<String, TrackSource>,
}

/// One entry of the decorated queue listing returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedTrack {
    pub info: TrackRef,
    pub votes: u32,
    /// Whether the requesting fingerprint has voted to skip this track.
    pub voted: bool,
    /// Whether the requesting fingerprint added this track.
    pub added_by_me: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub skip_threshold: u32,
    #[serde(default)]
    pub playlists: Vec<Playlist>,
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub shuffle: bool,
}

fn default_true() -> bool {
    true
}

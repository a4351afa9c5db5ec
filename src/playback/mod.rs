use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A reference to a playable track as known by the playback core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRef {
    pub uri: String,
    pub name: String,
    /// Track length in milliseconds, when the playback core knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_ms: Option<u64>,
}

impl TrackRef {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            length_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportState {
    Playing,
    Stopped,
}

/// Failures originating in the playback core.
///
/// `Unresolvable` and `Stalled` are recovered locally by the orchestrator
/// (denylist + retry) and never reach end users; they surface only in logs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlaybackError {
    #[error("track {uri} could not be resolved")]
    Unresolvable { uri: String },

    #[error("playback core unavailable: {0}")]
    Unavailable(String),

    #[error("transport stuck in stopped state with an empty queue")]
    Stalled,
}

/// The external playback core: track queue, transport, and library access.
///
/// The engine is the only caller and always runs on its serialized worker,
/// so implementations never see concurrent calls.
#[async_trait]
pub trait PlaybackCore: Send + Sync {
    /// Insert a track at the front of the play queue. Fails with
    /// [`PlaybackError::Unresolvable`] when the uri cannot be loaded.
    async fn enqueue_at_front(&self, uri: &str) -> Result<(), PlaybackError>;

    /// Append a track to the end of the play queue.
    async fn enqueue_at_end(&self, uri: &str) -> Result<(), PlaybackError>;

    /// Remove every queue entry with the given uri. Removing an absent uri
    /// is a no-op.
    async fn remove_by_uri(&self, uri: &str);

    async fn queue_length(&self) -> usize;

    async fn queue_contains(&self, uri: &str) -> bool;

    /// The current queue, in play order.
    async fn queue_tracks(&self) -> Vec<TrackRef>;

    async fn transport_state(&self) -> TransportState;

    async fn play(&self);

    async fn stop(&self);

    async fn clear_queue(&self);

    /// All tracks from the local library, used in offline sessions.
    async fn browse_local_library(&self) -> Vec<TrackRef>;

    /// The items of one playlist, in playlist order. Unknown playlists
    /// yield an empty list.
    async fn playlist_items(&self, playlist_uri: &str) -> Vec<TrackRef>;

    /// Resolve uris to track refs. Unresolvable uris are omitted.
    async fn lookup_tracks(&self, uris: &[String]) -> Vec<TrackRef>;
}

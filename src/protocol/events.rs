use serde::Serialize;

use crate::protocol::models::SessionSnapshot;

/// Events broadcast to the transport layer for client notification.
///
/// Serialized as `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum PartyEvent {
    #[serde(rename = "SESSION_STARTED")]
    SessionStarted { session: SessionSnapshot },

    #[serde(rename = "SESSION_ENDED")]
    SessionEnded {},

    #[serde(rename = "SESSION_PLAYLISTS_UPDATED")]
    SessionPlaylistsUpdated { session: SessionSnapshot },

    #[serde(rename = "VOTE_ADDED")]
    VoteAdded {},
}

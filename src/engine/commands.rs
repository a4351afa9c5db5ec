use tokio::sync::oneshot;

use crate::common::errors::EngineError;
use crate::common::types::Fingerprint;
use crate::playback::TrackRef;
use crate::protocol::models::{Playlist, QueuedTrack, SessionSnapshot, StartSessionRequest};

type Reply<T> = oneshot::Sender<T>;

/// Operations delivered to the serialized engine worker, one at a time, in
/// arrival order. Request-style commands carry a reply sender; playback
/// callbacks are fire-and-forget.
pub(crate) enum Command {
    StartSession {
        request: StartSessionRequest,
        reply: Reply<SessionSnapshot>,
    },
    UpdatePlaylists {
        playlists: Vec<Playlist>,
        reply: Reply<Result<SessionSnapshot, EngineError>>,
    },
    EndSession {
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<SessionSnapshot>,
    },
    QueuedTracks {
        fingerprint: Fingerprint,
        reply: Reply<Vec<QueuedTrack>>,
    },
    AddTrack {
        fingerprint: Fingerprint,
        uri: String,
        reply: Reply<Result<(), EngineError>>,
    },
    RemoveTrack {
        fingerprint: Fingerprint,
        uri: String,
        reply: Reply<Result<(), EngineError>>,
    },
    CastVote {
        fingerprint: Fingerprint,
        uri: String,
        reply: Reply<Result<u32, EngineError>>,
    },
    HasVoted {
        fingerprint: Fingerprint,
        uri: String,
        reply: Reply<bool>,
    },
    VoteCooldown {
        fingerprint: Fingerprint,
        reply: Reply<u64>,
    },
    Suggestions {
        length: usize,
        reply: Reply<Vec<TrackRef>>,
    },
    TrackStarted {
        uri: String,
    },
    TrackEnded {
        uri: String,
        length_ms: Option<u64>,
        elapsed_ms: Option<u64>,
    },
}

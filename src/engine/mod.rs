pub(crate) mod commands;
pub(crate) mod orchestrator;
pub(crate) mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tracing::warn;

use crate::common::errors::EngineError;
use crate::common::types::Fingerprint;
use crate::configs::Config;
use crate::engine::commands::Command;
use crate::engine::orchestrator::QueueOrchestrator;
use crate::playback::{PlaybackCore, TrackRef};
use crate::protocol::events::PartyEvent;
use crate::protocol::models::{Playlist, QueuedTrack, SessionSnapshot, StartSessionRequest};
use crate::session::nicknames::NicknameRegistry;

/// How long a caller blocks on the worker before giving up. A timeout is a
/// local failure only: the accepted operation still completes.
const CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_BUFFER: usize = 64;

/// The party-queue engine. `spawn` starts the serialized worker that owns
/// all session, queue, and vote state, and returns the handle everything
/// else talks through.
pub struct Engine;

impl Engine {
    pub fn spawn(config: Config, playback: Arc<dyn PlaybackCore>) -> EngineHandle {
        let (commands, mailbox) = flume::unbounded();
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let nicknames = Arc::new(NicknameRegistry::new());

        let orchestrator =
            QueueOrchestrator::new(&config, playback, events.clone(), Arc::clone(&nicknames));
        tokio::spawn(worker::run(orchestrator, mailbox));

        EngineHandle {
            commands,
            events,
            nicknames,
        }
    }
}

/// Cloneable handle the request layer drives the engine through.
#[derive(Clone)]
pub struct EngineHandle {
    commands: flume::Sender<Command>,
    events: broadcast::Sender<PartyEvent>,
    nicknames: Arc<NicknameRegistry>,
}

impl EngineHandle {
    /// Subscribe to client-notification events (`SESSION_STARTED`, ...).
    pub fn subscribe(&self) -> broadcast::Receiver<PartyEvent> {
        self.events.subscribe()
    }

    /// Stable pseudonym for a fingerprint. Served straight off the shared
    /// registry; no worker round-trip.
    pub fn nickname_for(&self, fingerprint: &Fingerprint) -> String {
        self.nicknames.nickname_for(fingerprint)
    }

    pub async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<SessionSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::StartSession { request, reply }, rx).await
    }

    pub async fn update_playlists(
        &self,
        playlists: Vec<Playlist>,
    ) -> Result<SessionSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::UpdatePlaylists { playlists, reply }, rx)
            .await?
    }

    pub async fn end_session(&self) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::EndSession { reply }, rx).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Snapshot { reply }, rx).await
    }

    pub async fn queued_tracks(
        &self,
        fingerprint: Fingerprint,
    ) -> Result<Vec<QueuedTrack>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::QueuedTracks { fingerprint, reply }, rx)
            .await
    }

    pub async fn add_track(&self, fingerprint: Fingerprint, uri: String) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::AddTrack {
                fingerprint,
                uri,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn remove_track(
        &self,
        fingerprint: Fingerprint,
        uri: String,
    ) -> Result<(), EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::RemoveTrack {
                fingerprint,
                uri,
                reply,
            },
            rx,
        )
        .await?
    }

    /// Cast a skip vote. Returns the new tally.
    pub async fn cast_vote(&self, fingerprint: Fingerprint, uri: String) -> Result<u32, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::CastVote {
                fingerprint,
                uri,
                reply,
            },
            rx,
        )
        .await?
    }

    pub async fn has_voted(&self, fingerprint: Fingerprint, uri: String) -> Result<bool, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(
            Command::HasVoted {
                fingerprint,
                uri,
                reply,
            },
            rx,
        )
        .await
    }

    /// Seconds until the fingerprint may vote again; 0 when allowed now.
    pub async fn vote_cooldown(&self, fingerprint: Fingerprint) -> Result<u64, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::VoteCooldown { fingerprint, reply }, rx)
            .await
    }

    pub async fn suggestions(&self, length: usize) -> Result<Vec<TrackRef>, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Suggestions { length, reply }, rx).await
    }

    /// Playback-core callback: a track finished (or died). Fire-and-forget;
    /// processed in order with every other operation.
    pub fn notify_track_ended(&self, uri: String, length_ms: Option<u64>, elapsed_ms: Option<u64>) {
        if self
            .commands
            .send(Command::TrackEnded {
                uri,
                length_ms,
                elapsed_ms,
            })
            .is_err()
        {
            warn!("dropping track-ended callback, engine worker is gone");
        }
    }

    /// Playback-core callback: a track started playing.
    pub fn notify_track_started(&self, uri: String) {
        if self.commands.send(Command::TrackStarted { uri }).is_err() {
            warn!("dropping track-started callback, engine worker is gone");
        }
    }

    async fn call<T>(&self, command: Command, rx: oneshot::Receiver<T>) -> Result<T, EngineError> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::Closed)?;
        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(EngineError::Closed),
            Err(_) => Err(EngineError::Timeout),
        }
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::common::errors::EngineError;
use crate::common::types::{now_ms, Fingerprint};
use crate::configs::Config;
use crate::playback::{PlaybackCore, PlaybackError, TrackRef, TransportState};
use crate::protocol::events::PartyEvent;
use crate::protocol::models::{
    Playlist, QueuedTrack, SessionSnapshot, SourceKind, StartSessionRequest,
};
use crate::session::nicknames::NicknameRegistry;
use crate::session::votes::VoteLedger;
use crate::session::SessionManager;

/// How long to wait after issuing a play command before concluding that the
/// selected track silently failed to start.
const START_GRACE: Duration = Duration::from_millis(300);

/// Provenance name for offline-mode candidates.
const OFFLINE_SOURCE_NAME: &str = "Local Library";

/// A track eligible for automatic selection, tagged with where it came from.
struct Candidate {
    uri: String,
    name: String,
    source: String,
}

/// The scheduler: derives the candidate queue, drives what plays next, and
/// recovers from playback failures. Owns all mutable session state; runs
/// exclusively on the engine worker, so it never sees concurrent calls.
pub(crate) struct QueueOrchestrator {
    session: SessionManager,
    votes: VoteLedger,
    nicknames: Arc<NicknameRegistry>,
    playback: Arc<dyn PlaybackCore>,
    events: broadcast::Sender<PartyEvent>,
    offline: bool,
    easter_eggs: Vec<String>,
    /// The uri most recently auto-inserted at the queue front, denylisted
    /// if the transport stalls before it ever starts.
    last_selected: Option<String>,
}

impl QueueOrchestrator {
    pub(crate) fn new(
        config: &Config,
        playback: Arc<dyn PlaybackCore>,
        events: broadcast::Sender<PartyEvent>,
        nicknames: Arc<NicknameRegistry>,
    ) -> Self {
        Self {
            session: SessionManager::new(
                config.data_dir.clone(),
                config.session.banned_uris.clone(),
                config.queue.limit_per_user,
            ),
            votes: VoteLedger::new(config.votes.limit_count, config.votes.limit_minutes),
            nicknames,
            playback,
            events,
            offline: config.session.offline,
            easter_eggs: config.session.easter_egg_uris.clone(),
            last_selected: None,
        }
    }

    // ---- session lifecycle -------------------------------------------------

    pub(crate) async fn start_session(&mut self, request: StartSessionRequest) -> SessionSnapshot {
        let StartSessionRequest {
            skip_threshold,
            playlists,
            auto_start,
            shuffle,
        } = request;

        self.votes.reset();
        self.last_selected = None;
        self.session.start(skip_threshold, playlists, shuffle);

        if auto_start && self.select_next().await {
            self.ensure_playing().await;
        }

        let snapshot = self.session.snapshot();
        self.emit(PartyEvent::SessionStarted {
            session: snapshot.clone(),
        });
        snapshot
    }

    pub(crate) async fn update_playlists(
        &mut self,
        playlists: Vec<Playlist>,
    ) -> Result<SessionSnapshot, EngineError> {
        if !self.session.is_started() {
            return Err(EngineError::NoActiveSession);
        }
        if playlists.is_empty() {
            return Err(EngineError::NoPlaylistsSelected);
        }

        self.session.update_playlists(playlists)?;
        let remaining = self.compute_candidates().await.len();
        info!("updated session playlists, {} tracks remaining", remaining);

        let snapshot = self.session.snapshot();
        self.emit(PartyEvent::SessionPlaylistsUpdated {
            session: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// User-initiated session end.
    pub(crate) async fn end_session(&mut self) {
        self.playback.stop().await;
        self.playback.clear_queue().await;
        self.finish_session();
    }

    /// Persist history, reset state, and notify clients. Shared by the
    /// user-initiated path and natural conclusion (candidate pool ran dry).
    fn finish_session(&mut self) {
        self.session.end();
        self.votes.reset();
        self.last_selected = None;
        self.emit(PartyEvent::SessionEnded {});
    }

    // ---- scheduling --------------------------------------------------------

    /// Recompute the ordered candidate queue: flatten the configured source
    /// (local library when offline, otherwise every session playlist in
    /// order), shuffle before filtering when enabled, drop played and
    /// denylisted uris, and de-duplicate keeping the first occurrence.
    async fn compute_candidates(&mut self) -> Vec<Candidate> {
        let mut items: Vec<Candidate> = if self.offline {
            self.playback
                .browse_local_library()
                .await
                .into_iter()
                .map(|track| Candidate {
                    uri: track.uri,
                    name: track.name,
                    source: OFFLINE_SOURCE_NAME.to_string(),
                })
                .collect()
        } else {
            let mut items = Vec::new();
            for playlist in self.session.playlists().to_vec() {
                let tracks = self.playback.playlist_items(&playlist.uri).await;
                items.extend(tracks.into_iter().map(|track| Candidate {
                    uri: track.uri,
                    name: track.name,
                    source: playlist.name.clone(),
                }));
            }
            items
        };

        if self.session.shuffle() {
            items.shuffle(&mut rand::thread_rng());
        }

        let mut seen = HashSet::new();
        let candidates: Vec<Candidate> = items
            .into_iter()
            .filter(|candidate| {
                self.session.can_play(&candidate.uri) && seen.insert(candidate.uri.clone())
            })
            .collect();

        self.session
            .set_remaining(candidates.iter().map(|c| c.uri.clone()).collect());
        candidates
    }

    /// Queue the next eligible candidate at the front of the play queue.
    ///
    /// An explicit loop, not recursion: every rejected insertion denylists
    /// the failed uri, so each recomputation strictly shrinks the candidate
    /// set. Returns false when the pool ran dry and the session ended.
    pub(crate) async fn select_next(&mut self) -> bool {
        loop {
            let mut candidates = self.compute_candidates().await;
            if candidates.is_empty() {
                info!("no more tracks to play, ending session");
                self.playback.stop().await;
                self.playback.clear_queue().await;
                self.finish_session();
                return false;
            }

            let next = candidates.remove(0);
            match self.playback.enqueue_at_front(&next.uri).await {
                Ok(()) => {
                    self.session
                        .set_track_source(&next.uri, SourceKind::Playlist, &next.source);
                    info!(
                        "auto-queued {} ({}) from '{}'",
                        next.name, next.uri, next.source
                    );
                    self.last_selected = Some(next.uri);
                    return true;
                }
                Err(err) => {
                    warn!("failed to queue {}: {}", next.uri, err);
                    self.session.denylist_add(&next.uri);
                }
            }
        }
    }

    /// Make sure the transport is running. Tracks can silently fail to
    /// start and vanish from the queue before playback begins; after a
    /// short grace delay a stopped transport over an empty queue means the
    /// last selected track is a dud: denylist it and pick another.
    pub(crate) async fn ensure_playing(&mut self) {
        loop {
            if self.playback.transport_state().await != TransportState::Stopped {
                return;
            }
            self.playback.play().await;
            info!("started playback");

            tokio::time::sleep(START_GRACE).await;

            let state = self.playback.transport_state().await;
            let queue_len = self.playback.queue_length().await;
            if state == TransportState::Stopped && queue_len == 0 {
                warn!("{}, trying the next track", PlaybackError::Stalled);
                if let Some(uri) = self.last_selected.take() {
                    self.session.denylist_add(&uri);
                    self.votes.clear_track(&uri);
                }
                if !self.select_next().await {
                    return;
                }
                continue;
            }
            return;
        }
    }

    // ---- playback callbacks ------------------------------------------------

    pub(crate) fn on_track_started(&self, uri: &str) {
        info!("track playback started: {}", uri);
    }

    pub(crate) async fn on_track_ended(
        &mut self,
        uri: &str,
        length_ms: Option<u64>,
        elapsed_ms: Option<u64>,
    ) {
        if !self.session.is_started() {
            return;
        }

        // A genuine early failure leaves the queue empty (a manual skip to
        // another track does not), and a real listen of a >10s track never
        // ends inside 2s.
        let queue_len = self.playback.queue_length().await;
        let failed = matches!(elapsed_ms, Some(elapsed) if elapsed < 2_000)
            && queue_len == 0
            && length_ms.map_or(true, |length| length > 10_000);

        if failed {
            warn!(
                "track {} ended after only {}ms (length: {}ms), treating as playback failure",
                uri,
                elapsed_ms.unwrap_or(0),
                length_ms.map_or_else(|| "unknown".to_string(), |l| l.to_string()),
            );
            self.session.denylist_add(uri);
        } else {
            self.session.mark_played(uri);
        }
        // Either way the track has left the queue.
        self.votes.clear_track(uri);

        if self.easter_eggs.iter().any(|egg| egg == uri)
            && self.playback.queue_length().await == 0
        {
            if let Some(egg) = self.easter_eggs.first().cloned() {
                match self.playback.enqueue_at_front(&egg).await {
                    Ok(()) => {
                        info!("meow");
                        self.last_selected = Some(egg);
                        self.ensure_playing().await;
                        return;
                    }
                    Err(err) => warn!("failed to queue easter egg {}: {}", egg, err),
                }
            }
        }

        if self.playback.queue_length().await == 0 && self.select_next().await {
            self.ensure_playing().await;
        }
    }

    // ---- guest operations --------------------------------------------------

    pub(crate) async fn add_manual_track(
        &mut self,
        fingerprint: Fingerprint,
        uri: &str,
    ) -> Result<(), EngineError> {
        if self.session.played().iter().any(|played| played == uri) {
            return Err(EngineError::AlreadyPlayed);
        }
        if self.playback.queue_contains(uri).await {
            return Err(EngineError::AlreadyQueued);
        }
        if !self.session.manual_mut().try_reserve(&fingerprint, uri) {
            return Err(EngineError::UserQueueLimit);
        }

        if let Err(err) = self.playback.enqueue_at_end(uri).await {
            self.session.manual_mut().release(uri);
            return Err(err.into());
        }

        let nickname = self.nicknames.nickname_for(&fingerprint);
        self.session
            .set_track_source(uri, SourceKind::User, &nickname);
        info!("{} ({}) queued {}", nickname, fingerprint, uri);
        Ok(())
    }

    pub(crate) async fn remove_manual_track(
        &mut self,
        fingerprint: Fingerprint,
        uri: &str,
    ) -> Result<(), EngineError> {
        if !self.session.manual().owned_by(&fingerprint, uri) {
            return Err(EngineError::NotOwner);
        }

        // Owner-initiated removal is not a failure: no denylist entry.
        self.playback.remove_by_uri(uri).await;
        self.votes.clear_track(uri);
        self.session.manual_mut().release(uri);
        info!("{} withdrew {}", fingerprint, uri);
        Ok(())
    }

    pub(crate) async fn cast_vote(
        &mut self,
        fingerprint: Fingerprint,
        uri: &str,
    ) -> Result<u32, EngineError> {
        let count = self.votes.register_vote(&fingerprint, uri, now_ms())?;
        let threshold = self.session.skip_threshold();
        info!(
            "vote added for {} by {} ({}/{})",
            uri, fingerprint, count, threshold
        );
        self.emit(PartyEvent::VoteAdded {});

        if count >= threshold {
            info!("skipping {} due to votes", uri);
            self.playback.remove_by_uri(uri).await;
            self.votes.clear_track(uri);
            self.session.manual_mut().release(uri);
            self.session.denylist_add(uri);
        }
        Ok(count)
    }

    // ---- queries -----------------------------------------------------------

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub(crate) fn has_voted(&self, fingerprint: &Fingerprint, uri: &str) -> bool {
        self.votes.has_voted(fingerprint, uri)
    }

    pub(crate) fn vote_cooldown(&self, fingerprint: &Fingerprint) -> u64 {
        self.votes.cooldown_seconds(fingerprint, now_ms())
    }

    /// The current play queue decorated with vote and ownership info for
    /// one requesting user.
    pub(crate) async fn queued_tracks(&self, fingerprint: &Fingerprint) -> Vec<QueuedTrack> {
        self.playback
            .queue_tracks()
            .await
            .into_iter()
            .map(|info| {
                let votes = self.votes.count(&info.uri);
                let voted = self.votes.has_voted(fingerprint, &info.uri);
                let added_by_me = self.session.manual().owned_by(fingerprint, &info.uri);
                QueuedTrack {
                    info,
                    votes,
                    voted,
                    added_by_me,
                }
            })
            .collect()
    }

    /// Up to `length` suggestion tracks sampled from the persisted history,
    /// excluding anything already played or currently queued.
    pub(crate) async fn suggestions(&self, length: usize) -> Vec<TrackRef> {
        let mut pool = Vec::new();
        for uri in self.session.suggestions() {
            if !self.playback.queue_contains(&uri).await {
                pool.push(uri);
            }
        }

        let size = pool.len().min(length);
        let sample: Vec<String> = pool
            .choose_multiple(&mut rand::thread_rng(), size)
            .cloned()
            .collect();
        self.playback.lookup_tracks(&sample).await
    }

    fn emit(&self, event: PartyEvent) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.events.send(event);
    }
}

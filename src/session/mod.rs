pub mod history;
pub mod limiter;
pub mod nicknames;
pub mod votes;

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::common::errors::EngineError;
use crate::common::types::now_ms;
use crate::protocol::models::{Playlist, SessionSnapshot, SourceKind, TrackSource};
use crate::session::history::QueueHistory;
use crate::session::limiter::ManualQueueLimiter;

/// The session singleton: lifecycle, playlist selection, denylist, played
/// set, provenance, manual queue, and the persisted suggestion history.
///
/// A process holds exactly one of these; ending a session resets it rather
/// than destroying it.
pub struct SessionManager {
    data_dir: PathBuf,
    seed_denylist: Vec<String>,

    started: bool,
    start_time: Option<u64>,
    skip_threshold: u32,
    playlists: Vec<Playlist>,
    shuffle: bool,

    denylist: Vec<String>,
    played: Vec<String>,
    remaining: Vec<String>,
    track_sources: HashMap<String, TrackSource>,
    manual: ManualQueueLimiter,
    history: QueueHistory,
}

impl SessionManager {
    pub fn new(data_dir: PathBuf, seed_denylist: Vec<String>, queue_limit_per_user: usize) -> Self {
        let history = QueueHistory::empty(&data_dir);
        Self {
            data_dir,
            denylist: seed_denylist.clone(),
            seed_denylist,
            started: false,
            start_time: None,
            skip_threshold: 1,
            playlists: Vec::new(),
            shuffle: false,
            played: Vec::new(),
            remaining: Vec::new(),
            track_sources: HashMap::new(),
            manual: ManualQueueLimiter::new(queue_limit_per_user),
            history,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn skip_threshold(&self) -> u32 {
        self.skip_threshold
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn played(&self) -> &[String] {
        &self.played
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    pub fn manual(&self) -> &ManualQueueLimiter {
        &self.manual
    }

    pub fn manual_mut(&mut self) -> &mut ManualQueueLimiter {
        &mut self.manual
    }

    /// Begin a session. Any leftover ephemeral state is cleared first, the
    /// persisted queue history is (re)loaded, and thresholds below 1 are
    /// clamped.
    pub fn start(&mut self, skip_threshold: u32, playlists: Vec<Playlist>, shuffle: bool) {
        self.reset();
        self.started = true;
        self.start_time = Some(now_ms());
        self.skip_threshold = skip_threshold.max(1);
        self.playlists = playlists;
        self.shuffle = shuffle;
        self.history = QueueHistory::load(&self.data_dir);

        let playlist_names: Vec<&str> = self
            .playlists
            .iter()
            .map(|playlist| playlist.name.as_str())
            .collect();
        info!(
            "started session with skip threshold {} and {} playlists: {}",
            self.skip_threshold,
            self.playlists.len(),
            playlist_names.join(",")
        );
    }

    /// Swap the playlist selection mid-session. Played tracks, the
    /// denylist, votes, and the manual queue are all preserved; the caller
    /// recomputes the candidate queue.
    pub fn update_playlists(&mut self, playlists: Vec<Playlist>) -> Result<(), EngineError> {
        if !self.started {
            return Err(EngineError::NoActiveSession);
        }

        let old_names: Vec<&str> = self.playlists.iter().map(|p| p.name.as_str()).collect();
        let new_names: Vec<&str> = playlists.iter().map(|p| p.name.as_str()).collect();
        info!(
            "updated session playlists from [{}] to [{}]",
            old_names.join(","),
            new_names.join(",")
        );

        self.playlists = playlists;
        Ok(())
    }

    /// End the session: persist still-queued, non-denylisted manual tracks
    /// into the suggestion history, then reset all ephemeral state.
    pub fn end(&mut self) {
        let additions: Vec<String> = self
            .manual
            .flat()
            .iter()
            .filter(|uri| !self.denylist.contains(*uri))
            .cloned()
            .collect();
        self.history.append(additions);
        if let Err(err) = self.history.save() {
            warn!("failed to persist queue history: {err}");
        }

        self.reset();
        info!("ended session");
    }

    pub fn mark_played(&mut self, uri: &str) {
        self.played.push(uri.to_string());
        // The track has left the queue, regardless of who added it.
        self.manual.release(uri);
    }

    pub fn denylist_add(&mut self, uri: &str) {
        if !self.denylist.iter().any(|denied| denied == uri) {
            self.denylist.push(uri.to_string());
        }
    }

    /// Whether a uri is still eligible for automatic selection.
    pub fn can_play(&self, uri: &str) -> bool {
        !self.played.iter().any(|played| played == uri)
            && !self.denylist.iter().any(|denied| denied == uri)
    }

    pub fn set_remaining(&mut self, uris: Vec<String>) {
        self.remaining = uris;
    }

    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// Record why a track is in the queue; overwrites any previous entry.
    pub fn set_track_source(&mut self, uri: &str, kind: SourceKind, name: &str) {
        self.track_sources.insert(
            uri.to_string(),
            TrackSource {
                kind,
                name: name.to_string(),
            },
        );
    }

    /// Suggestion candidates: the persisted history minus already-played
    /// tracks.
    pub fn suggestions(&self) -> Vec<String> {
        self.history
            .uris()
            .iter()
            .filter(|uri| !self.played.iter().any(|played| played == *uri))
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            started: self.started,
            start_time: self.start_time,
            skip_threshold: self.skip_threshold,
            playlists: self.playlists.clone(),
            played_tracks: self.played.clone(),
            remaining_playlist_tracks: self.remaining.clone(),
            track_sources: self.track_sources.clone(),
        }
    }

    fn reset(&mut self) {
        self.started = false;
        self.start_time = None;
        self.skip_threshold = 1;
        self.playlists.clear();
        self.shuffle = false;
        self.denylist = self.seed_denylist.clone();
        self.played.clear();
        self.remaining.clear();
        self.track_sources.clear();
        self.manual.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Fingerprint;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "partybox-session-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn manager(tag: &str) -> SessionManager {
        SessionManager::new(temp_dir(tag), vec!["track:banned".to_string()], 0)
    }

    fn playlist(name: &str) -> Playlist {
        Playlist {
            uri: format!("playlist:{name}"),
            name: name.to_string(),
        }
    }

    #[test]
    fn idle_session_is_defaulted() {
        let manager = manager("idle");
        assert!(!manager.is_started());
        assert!(manager.played().is_empty());
        assert_eq!(manager.denylist(), ["track:banned"]);
        assert!(manager.snapshot().playlists.is_empty());
    }

    #[test]
    fn update_playlists_requires_active_session() {
        let mut manager = manager("update-idle");
        let result = manager.update_playlists(vec![playlist("p1")]);
        assert!(matches!(result, Err(EngineError::NoActiveSession)));
    }

    #[test]
    fn update_playlists_preserves_session_state() {
        let mut manager = manager("update-active");
        manager.start(2, vec![playlist("p1")], false);
        manager.mark_played("track:a");
        manager.denylist_add("track:b");

        manager.update_playlists(vec![playlist("p2")]).unwrap();
        assert_eq!(manager.playlists()[0].name, "p2");
        assert_eq!(manager.played(), ["track:a"]);
        assert!(manager.denylist().iter().any(|uri| uri == "track:b"));
    }

    #[test]
    fn end_then_start_resets_ephemeral_state() {
        let mut manager = manager("reset");
        manager.start(2, vec![playlist("p1")], false);
        manager.mark_played("track:a");
        manager.denylist_add("track:b");
        manager.set_track_source("track:a", SourceKind::Playlist, "p1");
        manager.end();

        manager.start(3, vec![playlist("p2")], true);
        assert!(manager.is_started());
        assert!(manager.played().is_empty());
        assert_eq!(manager.denylist(), ["track:banned"]);
        assert!(manager.snapshot().track_sources.is_empty());
    }

    #[test]
    fn skip_threshold_is_clamped_to_one() {
        let mut manager = manager("clamp");
        manager.start(0, vec![], false);
        assert_eq!(manager.skip_threshold(), 1);
    }

    #[test]
    fn end_persists_manual_non_denylisted_tracks() {
        let dir = temp_dir("history");
        let alice = Fingerprint::from("alice");

        let mut manager = SessionManager::new(dir.clone(), vec![], 0);
        manager.start(1, vec![], false);
        manager.manual_mut().try_reserve(&alice, "track:kept");
        manager.manual_mut().try_reserve(&alice, "track:dropped");
        manager.denylist_add("track:dropped");
        manager.end();

        let mut next = SessionManager::new(dir.clone(), vec![], 0);
        next.start(1, vec![], false);
        assert_eq!(next.suggestions(), ["track:kept"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn played_tracks_are_excluded_from_suggestions() {
        let dir = temp_dir("suggestions");
        let alice = Fingerprint::from("alice");

        let mut manager = SessionManager::new(dir.clone(), vec![], 0);
        manager.start(1, vec![], false);
        manager.manual_mut().try_reserve(&alice, "track:x");
        manager.manual_mut().try_reserve(&alice, "track:y");
        manager.end();

        let mut next = SessionManager::new(dir.clone(), vec![], 0);
        next.start(1, vec![], false);
        next.mark_played("track:x");
        assert_eq!(next.suggestions(), ["track:y"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn mark_played_releases_manual_entries() {
        let mut manager = manager("mark-played");
        let alice = Fingerprint::from("alice");
        manager.start(1, vec![], false);
        manager.manual_mut().try_reserve(&alice, "track:x");

        manager.mark_played("track:x");
        assert!(!manager.manual().owned_by(&alice, "track:x"));
        assert!(!manager.can_play("track:x"));
    }

    #[test]
    fn denylist_add_is_idempotent() {
        let mut manager = manager("denylist");
        manager.start(1, vec![], false);
        manager.denylist_add("track:x");
        manager.denylist_add("track:x");
        let count = manager
            .denylist()
            .iter()
            .filter(|uri| uri.as_str() == "track:x")
            .count();
        assert_eq!(count, 1);
    }
}

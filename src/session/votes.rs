use std::collections::{HashMap, HashSet};

use crate::common::errors::EngineError;
use crate::common::types::Fingerprint;

/// Vote tallies, voter sets, and the per-user sliding-window rate limiter.
///
/// Invariant: `votes[uri]` always equals the size of `voters[uri]`; both
/// are only ever updated together.
pub struct VoteLedger {
    limit_count: usize,
    window_ms: u64,
    votes: HashMap<String, u32>,
    voters: HashMap<String, HashSet<Fingerprint>>,
    vote_times: HashMap<Fingerprint, Vec<u64>>,
}

impl VoteLedger {
    pub fn new(limit_count: usize, limit_minutes: u64) -> Self {
        Self {
            limit_count,
            window_ms: limit_minutes * 60_000,
            votes: HashMap::new(),
            voters: HashMap::new(),
            vote_times: HashMap::new(),
        }
    }

    pub fn count(&self, uri: &str) -> u32 {
        self.votes.get(uri).copied().unwrap_or(0)
    }

    pub fn has_voted(&self, fingerprint: &Fingerprint, uri: &str) -> bool {
        self.voters
            .get(uri)
            .map(|voters| voters.contains(fingerprint))
            .unwrap_or(false)
    }

    /// Register a skip vote. Returns the new tally for the track.
    ///
    /// A repeat vote from the same fingerprint on the same track is
    /// idempotent: it returns the current tally and consumes no rate-limit
    /// budget. Callers still pre-check [`Self::has_voted`] when they want to
    /// tell the user apart from a fresh vote.
    pub fn register_vote(
        &mut self,
        fingerprint: &Fingerprint,
        uri: &str,
        now: u64,
    ) -> Result<u32, EngineError> {
        if self.has_voted(fingerprint, uri) {
            return Ok(self.count(uri));
        }

        let timestamps = self.vote_times.entry(fingerprint.clone()).or_default();
        timestamps.retain(|stamp| now.saturating_sub(*stamp) <= self.window_ms);

        if timestamps.len() >= self.limit_count {
            // The earliest timestamp is the first to fall out of the window.
            let earliest = timestamps.iter().copied().min().unwrap_or(now);
            let seconds_remaining = (earliest + self.window_ms).saturating_sub(now) / 1000;
            return Err(EngineError::RateLimitExceeded { seconds_remaining });
        }

        timestamps.push(now);
        self.voters
            .entry(uri.to_string())
            .or_default()
            .insert(fingerprint.clone());
        let count = self.votes.entry(uri.to_string()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    /// Seconds until the fingerprint may cast another vote; 0 when allowed
    /// now.
    pub fn cooldown_seconds(&self, fingerprint: &Fingerprint, now: u64) -> u64 {
        let Some(timestamps) = self.vote_times.get(fingerprint) else {
            return 0;
        };
        let recent: Vec<u64> = timestamps
            .iter()
            .copied()
            .filter(|stamp| now.saturating_sub(*stamp) <= self.window_ms)
            .collect();

        if recent.len() < self.limit_count {
            return 0;
        }

        let earliest = recent.iter().copied().min().unwrap_or(now);
        (earliest + self.window_ms).saturating_sub(now) / 1000
    }

    /// Drop the tally and voter set for a track that left the queue.
    pub fn clear_track(&mut self, uri: &str) {
        self.votes.remove(uri);
        self.voters.remove(uri);
    }

    pub fn reset(&mut self) {
        self.votes.clear();
        self.voters.clear();
        self.vote_times.clear();
    }
}

use std::collections::HashMap;

use crate::common::types::Fingerprint;

/// Manual-queue bookkeeping: the flat ordered list of user-submitted uris
/// plus each fingerprint's own list, with an optional per-user cap.
pub struct ManualQueueLimiter {
    /// 0 means unlimited.
    limit_per_user: usize,
    flat: Vec<String>,
    per_user: HashMap<Fingerprint, Vec<String>>,
}

impl ManualQueueLimiter {
    pub fn new(limit_per_user: usize) -> Self {
        Self {
            limit_per_user,
            flat: Vec::new(),
            per_user: HashMap::new(),
        }
    }

    /// Reserve a manual-queue slot for the user. Returns false when the
    /// per-user cap is configured and already reached.
    pub fn try_reserve(&mut self, fingerprint: &Fingerprint, uri: &str) -> bool {
        if self.limit_per_user > 0 && self.user_count(fingerprint) >= self.limit_per_user {
            return false;
        }
        self.per_user
            .entry(fingerprint.clone())
            .or_default()
            .push(uri.to_string());
        self.flat.push(uri.to_string());
        true
    }

    /// Remove a uri from every user's list and the flat list.
    pub fn release(&mut self, uri: &str) {
        for tracks in self.per_user.values_mut() {
            tracks.retain(|queued| queued != uri);
        }
        self.per_user.retain(|_, tracks| !tracks.is_empty());
        self.flat.retain(|queued| queued != uri);
    }

    pub fn owned_by(&self, fingerprint: &Fingerprint, uri: &str) -> bool {
        self.per_user
            .get(fingerprint)
            .map(|tracks| tracks.iter().any(|queued| queued == uri))
            .unwrap_or(false)
    }

    pub fn user_count(&self, fingerprint: &Fingerprint) -> usize {
        self.per_user
            .get(fingerprint)
            .map(|tracks| tracks.len())
            .unwrap_or(0)
    }

    /// All manually queued uris, in submission order.
    pub fn flat(&self) -> &[String] {
        &self.flat
    }

    pub fn reset(&mut self) {
        self.flat.clear();
        self.per_user.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_applies_per_user() {
        let mut limiter = ManualQueueLimiter::new(1);
        let alice = Fingerprint::from("alice");
        let bob = Fingerprint::from("bob");

        assert!(limiter.try_reserve(&alice, "track:x"));
        assert!(!limiter.try_reserve(&alice, "track:y"));
        assert!(limiter.try_reserve(&bob, "track:y"));
        assert_eq!(limiter.user_count(&alice), 1);
        assert_eq!(limiter.flat(), ["track:x", "track:y"]);
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let mut limiter = ManualQueueLimiter::new(0);
        let alice = Fingerprint::from("alice");

        for i in 0..20 {
            assert!(limiter.try_reserve(&alice, &format!("track:{i}")));
        }
        assert_eq!(limiter.user_count(&alice), 20);
    }

    #[test]
    fn release_frees_the_slot() {
        let mut limiter = ManualQueueLimiter::new(1);
        let alice = Fingerprint::from("alice");

        assert!(limiter.try_reserve(&alice, "track:x"));
        assert!(limiter.owned_by(&alice, "track:x"));

        limiter.release("track:x");
        assert!(!limiter.owned_by(&alice, "track:x"));
        assert_eq!(limiter.user_count(&alice), 0);
        assert!(limiter.flat().is_empty());
        assert!(limiter.try_reserve(&alice, "track:y"));
    }
}

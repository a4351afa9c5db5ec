use serde::{Deserialize, Serialize};

/// Sliding-window vote rate limit, per user fingerprint.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VoteLimitsConfig {
    #[serde(default = "default_vote_limit_count")]
    pub limit_count: usize,
    #[serde(default = "default_vote_limit_minutes")]
    pub limit_minutes: u64,
}

fn default_vote_limit_count() -> usize {
    2
}

fn default_vote_limit_minutes() -> u64 {
    60
}

impl Default for VoteLimitsConfig {
    fn default() -> Self {
        Self {
            limit_count: default_vote_limit_count(),
            limit_minutes: default_vote_limit_minutes(),
        }
    }
}

/// Per-user manual queue cap. 0 means unlimited.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct QueueLimitConfig {
    #[serde(default)]
    pub limit_per_user: usize,
}

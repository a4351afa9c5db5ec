use crate::playback::PlaybackError;

/// Errors surfaced to the request layer as structured results.
///
/// Every variant carries a stable machine-readable code and an HTTP status
/// hint so the transport layer can map it without matching on variants.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("track has already been played this session")]
    AlreadyPlayed,

    #[error("track is already in the queue")]
    AlreadyQueued,

    #[error("user has reached their queue limit")]
    UserQueueLimit,

    #[error("track was not added by this user")]
    NotOwner,

    #[error("no active session")]
    NoActiveSession,

    #[error("at least one playlist must be selected")]
    NoPlaylistsSelected,

    #[error("vote limit exceeded, next vote allowed in {seconds_remaining}s")]
    RateLimitExceeded { seconds_remaining: u64 },

    #[error("playback core rejected the request: {0}")]
    Playback(#[from] PlaybackError),

    #[error("engine call timed out")]
    Timeout,

    #[error("engine worker is no longer running")]
    Closed,
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyPlayed => "ALREADY_PLAYED",
            Self::AlreadyQueued => "ALREADY_QUEUED",
            Self::UserQueueLimit => "USER_QUEUE_LIMIT",
            Self::NotOwner => "NOT_OWNER",
            Self::NoActiveSession => "NO_ACTIVE_SESSION",
            Self::NoPlaylistsSelected => "NO_PLAYLISTS",
            Self::RateLimitExceeded { .. } => "RATE_LIMIT",
            Self::Playback(_) => "PLAYBACK_ERROR",
            Self::Timeout => "ENGINE_TIMEOUT",
            Self::Closed => "ENGINE_CLOSED",
        }
    }

    /// HTTP status hint for the transport layer.
    pub fn status(&self) -> u16 {
        match self {
            Self::RateLimitExceeded { .. } => 429,
            Self::NotOwner => 403,
            Self::Playback(_) => 500,
            Self::Timeout => 504,
            Self::Closed => 503,
            _ => 400,
        }
    }

    /// Seconds until the caller may retry, for `Retry-After` style headers.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::RateLimitExceeded { seconds_remaining } => Some(*seconds_remaining),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses_are_stable() {
        assert_eq!(EngineError::AlreadyPlayed.code(), "ALREADY_PLAYED");
        assert_eq!(EngineError::NotOwner.status(), 403);
        assert_eq!(
            EngineError::RateLimitExceeded {
                seconds_remaining: 42
            }
            .status(),
            429
        );
        assert_eq!(
            EngineError::RateLimitExceeded {
                seconds_remaining: 42
            }
            .retry_after_seconds(),
            Some(42)
        );
        assert_eq!(EngineError::NoActiveSession.status(), 400);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// Source candidates from the playback core's local library instead of
    /// remote playlists.
    #[serde(default)]
    pub offline: bool,
    /// Playlist uris preselected in the session-creation UI.
    #[serde(default)]
    pub default_playlists: Vec<String>,
    #[serde(default = "default_skip_threshold")]
    pub default_skip_threshold: u32,
    /// Uris seeded into the denylist of every session.
    #[serde(default = "default_banned_uris")]
    pub banned_uris: Vec<String>,
    /// When one of these ends with an empty queue, the first is queued next
    /// instead of a playlist candidate.
    #[serde(default = "default_easter_egg_uris")]
    pub easter_egg_uris: Vec<String>,
}

fn default_skip_threshold() -> u32 {
    3
}

fn default_banned_uris() -> Vec<String> {
    vec!["spotify:track:0afhq8XCExXpqazXczTSve".to_string()]
}

fn default_easter_egg_uris() -> Vec<String> {
    vec![
        "spotify:track:0asT0RDbe4Vrf6pxLHgpkn".to_string(),
        "spotify:track:2HkHE4EeZyx9AncSN042q3".to_string(),
    ]
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            offline: false,
            default_playlists: Vec::new(),
            default_skip_threshold: default_skip_threshold(),
            banned_uris: default_banned_uris(),
            easter_egg_uris: default_easter_egg_uris(),
        }
    }
}

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::common::types::AnyResult;

const HISTORY_FILE: &str = "queue-history.json";

/// Durable, ordered list of previously party-queued track uris.
///
/// Stored as a flat JSON array of strings; read once at session start,
/// overwritten once at session end.
pub struct QueueHistory {
    path: PathBuf,
    uris: Vec<String>,
}

impl QueueHistory {
    /// An empty history that has not touched the disk.
    pub fn empty(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
            uris: Vec::new(),
        }
    }

    /// Read the history file. A missing file reads as empty; an unreadable
    /// or malformed one is logged and also reads as empty.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(HISTORY_FILE);
        let uris = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("malformed queue history at {}: {}", path.display(), err);
                Vec::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!("could not read queue history at {}: {}", path.display(), err);
                Vec::new()
            }
        };
        Self { path, uris }
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn append(&mut self, uris: impl IntoIterator<Item = String>) {
        self.uris.extend(uris);
    }

    pub fn save(&self) -> AnyResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.uris)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "partybox-history-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = temp_dir("missing");
        let history = QueueHistory::load(&dir);
        assert!(history.uris().is_empty());
    }

    #[test]
    fn append_save_load_round_trip() {
        let dir = temp_dir("roundtrip");

        let mut history = QueueHistory::load(&dir);
        history.append(["track:a".to_string(), "track:b".to_string()]);
        history.save().expect("save should succeed");

        let reloaded = QueueHistory::load(&dir);
        assert_eq!(reloaded.uris(), ["track:a", "track:b"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = temp_dir("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(HISTORY_FILE), "not json").unwrap();

        let history = QueueHistory::load(&dir);
        assert!(history.uris().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! State persistence
//!
//! Handles saving and loading the application state to/from its slot file.
//! Uses atomic writes (write to temp file, then rename) so a crash never
//! leaves a half-written slot behind.
//!
//! Storage location: `~/.local/share/onelink/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::config::Config;
use crate::models::AppState;

/// Result of reading the state slot
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing stored yet
    Missing,
    /// Stored state parsed successfully
    Loaded(AppState),
    /// Stored content was malformed and has been dropped
    Discarded { reason: String },
}

impl LoadOutcome {
    /// Collapse the outcome into a usable state
    ///
    /// Missing and discarded slots both start from an empty state.
    pub fn into_state(self) -> AppState {
        match self {
            LoadOutcome::Loaded(state) => state,
            LoadOutcome::Missing | LoadOutcome::Discarded { .. } => AppState::default(),
        }
    }
}

/// Persistence layer for the application state
pub struct StatePersistence {
    path: PathBuf,
}

impl StatePersistence {
    /// Create a persistence handler for the configured slot
    pub fn new(config: &Config) -> Self {
        Self::at_path(config.state_path())
    }

    /// Create a persistence handler for an explicit file
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a state file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the slot file in bytes (0 when missing)
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Save the whole state, replacing any previous value
    pub fn save(&self, state: &AppState) -> StorageResult<()> {
        let bytes = serde_json::to_vec(state)?;
        atomic_write(&self.path, &bytes)?;
        debug!(
            "Saved {} collection(s) to {:?}",
            state.collections.len(),
            self.path
        );
        Ok(())
    }

    /// Load the state from disk
    ///
    /// Unreadable bytes and malformed JSON are reported as
    /// [`LoadOutcome::Discarded`], never as an error. Only genuine I/O
    /// failures (permissions and the like) are returned as errors.
    pub fn load(&self) -> StorageResult<LoadOutcome> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) => return Err(StorageError::from_read(e, self.path.clone())),
        };

        let raw = match String::from_utf8(bytes) {
            Ok(raw) => raw,
            Err(e) => return Ok(self.discard(format!("not valid UTF-8: {}", e))),
        };

        if raw.trim().is_empty() {
            return Ok(LoadOutcome::Missing);
        }

        match serde_json::from_str::<AppState>(&raw) {
            Ok(state) => Ok(LoadOutcome::Loaded(state)),
            Err(e) => Ok(self.discard(e.to_string())),
        }
    }

    fn discard(&self, reason: String) -> LoadOutcome {
        warn!("Discarding unreadable state in {:?}: {}", self.path, reason);
        LoadOutcome::Discarded { reason }
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Collection, Link};
    use tempfile::TempDir;

    fn test_persistence(temp_dir: &TempDir) -> StatePersistence {
        StatePersistence::at_path(temp_dir.path().join("one-link.v1.json"))
    }

    fn sample_state() -> AppState {
        let mut reading = Collection::new("Reading");
        reading
            .links
            .push(Link::parse("https://example.com/b", None).unwrap());
        reading
            .links
            .push(Link::parse("https://example.com/a", Some("A")).unwrap());
        let tools = Collection::new("Tools");

        AppState {
            active_id: Some(reading.id),
            collections: vec![tools, reading],
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        assert!(!persistence.exists());
        assert!(matches!(persistence.load().unwrap(), LoadOutcome::Missing));

        let state = sample_state();
        persistence.save(&state).unwrap();
        assert!(persistence.exists());
        assert!(persistence.file_size() > 0);

        match persistence.load().unwrap() {
            LoadOutcome::Loaded(loaded) => assert_eq!(loaded, state),
            other => panic!("expected loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        persistence.save(&sample_state()).unwrap();
        persistence.save(&AppState::default()).unwrap();

        let loaded = persistence.load().unwrap().into_state();
        assert!(loaded.collections.is_empty());
        assert!(loaded.active_id.is_none());
    }

    #[test]
    fn test_malformed_json_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), "{not json").unwrap();
        let outcome = persistence.load().unwrap();
        assert!(matches!(outcome, LoadOutcome::Discarded { .. }));
        assert!(outcome.into_state().collections.is_empty());
    }

    #[test]
    fn test_non_array_collections_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(
            persistence.path(),
            r#"{"collections": {"oops": true}, "activeId": null}"#,
        )
        .unwrap();
        assert!(matches!(
            persistence.load().unwrap(),
            LoadOutcome::Discarded { .. }
        ));
    }

    #[test]
    fn test_invalid_utf8_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            persistence.load().unwrap(),
            LoadOutcome::Discarded { .. }
        ));
    }

    #[test]
    fn test_empty_file_is_missing() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), "  \n").unwrap();
        assert!(matches!(persistence.load().unwrap(), LoadOutcome::Missing));
    }

    #[test]
    fn test_missing_fields_default() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        fs::write(persistence.path(), "{}").unwrap();
        let state = persistence.load().unwrap().into_state();
        assert!(state.collections.is_empty());
        assert!(state.active_id.is_none());
    }

    #[test]
    fn test_invalid_active_id_keeps_collections() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = test_persistence(&temp_dir);

        let collection = Collection::new("Reading");
        let json = format!(
            r#"{{"collections": {}, "activeId": "abc123"}}"#,
            serde_json::to_string(&vec![collection.clone()]).unwrap()
        );
        fs::write(persistence.path(), json).unwrap();

        match persistence.load().unwrap() {
            LoadOutcome::Loaded(state) => {
                assert_eq!(state.collections, vec![collection]);
                assert!(state.active_id.is_none());
            }
            other => panic!("expected loaded state, got {:?}", other),
        }
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("c")
            .join("file.json");

        atomic_write(&nested_path, b"test data").unwrap();

        assert!(nested_path.exists());
        assert!(!nested_path.with_extension("tmp").exists());
        let content = fs::read_to_string(&nested_path).unwrap();
        assert_eq!(content, "test data");
    }
}

//! Storage layer
//!
//! Persists the whole [`AppState`](crate::models::AppState) as one JSON
//! blob in a single slot on disk.
//!
//! ## Slots
//!
//! A slot is addressed by a versioned storage key (`one-link:v1`). Bumping
//! the version points at a new, empty slot; there is no migration between
//! versions.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{LoadOutcome, StatePersistence};

/// Storage key of the current state format
pub const STORAGE_KEY: &str = "one-link:v1";

/// Map a storage key to the file name that holds its slot
///
/// `one-link:v1` becomes `one-link.v1.json`.
pub fn slot_file_name(key: &str) -> String {
    let stem: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '.' })
        .collect();
    format!("{}.json", stem)
}

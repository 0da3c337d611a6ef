//! Collection store
//!
//! The `Store` owns the in-memory [`AppState`] for the lifetime of a session
//! and writes the whole tree through [`StatePersistence`] after every
//! successful mutation.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let id = store.create_collection("Reading")?;
//! let link = store.add_link(id, "https://www.example.com/a", None)?;
//!
//! // Later, when the preview task reports back
//! store.apply_preview(link.id, &outcome)?;
//! ```

use anyhow::Context;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{AppState, Collection, Link};
use crate::preview::PreviewOutcome;
use crate::storage::{LoadOutcome, StatePersistence, StorageError};

/// Errors returned by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// The URL could not be parsed as an absolute URL
    #[error("Please add a valid URL ('{input}': {source})")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// A required name was blank
    #[error("Collection name cannot be empty")]
    EmptyName,

    /// No collection is selected
    #[error("No active collection. Create one first.")]
    NoActiveCollection,

    /// The referenced collection does not exist
    #[error("Collection not found: {0}")]
    CollectionNotFound(Uuid),

    /// Reading or writing the state slot failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    /// What the user can do about a storage failure, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Storage(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// What happened to a finished preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The link was found and updated
    Applied,
    /// The link no longer exists; the result was dropped
    Orphaned,
}

/// Single owner of the application state
pub struct Store {
    state: AppState,
    persistence: StatePersistence,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(config)?)
    }

    /// Open the store with a specific configuration
    ///
    /// A missing or unreadable slot starts an empty state. If collections
    /// exist but none is active, the first one becomes active.
    pub fn open_with_config(config: Config) -> StoreResult<Self> {
        let persistence = StatePersistence::new(&config);

        let outcome = persistence.load()?;
        match &outcome {
            LoadOutcome::Loaded(_) => {}
            LoadOutcome::Missing => debug!("No stored state at {:?}", persistence.path()),
            LoadOutcome::Discarded { reason } => {
                debug!("Starting with empty state ({})", reason)
            }
        }
        let mut state = outcome.into_state();
        state.normalize_active();

        info!(
            "Opened store with {} collection(s)",
            state.collections.len()
        );

        Ok(Self {
            state,
            persistence,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the persistence handler
    pub fn persistence(&self) -> &StatePersistence {
        &self.persistence
    }

    /// Read-only view of the whole state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// All collections, newest first
    pub fn collections(&self) -> &[Collection] {
        &self.state.collections
    }

    /// ID of the active collection
    pub fn active_id(&self) -> Option<Uuid> {
        self.state.active_id
    }

    /// The active collection
    pub fn active(&self) -> Option<&Collection> {
        self.state.active()
    }

    /// Get a collection by ID
    pub fn collection(&self, id: Uuid) -> Option<&Collection> {
        self.state.collection(id)
    }

    /// Find a link in any collection
    pub fn find_link(&self, id: Uuid) -> Option<&Link> {
        self.state.find_link(id)
    }

    // ==================== Collection Operations ====================

    /// Create a collection, put it first, and make it active
    ///
    /// Names are trimmed; duplicates are allowed.
    pub fn create_collection(&mut self, name: &str) -> StoreResult<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let collection = Collection::new(name);
        let id = collection.id;
        self.state.collections.insert(0, collection);
        self.state.active_id = Some(id);
        self.save()?;

        info!("Created collection {}", id);
        Ok(id)
    }

    /// Switch the active collection
    ///
    /// Returns false (and changes nothing) if no collection has this ID.
    pub fn set_active(&mut self, id: Uuid) -> StoreResult<bool> {
        if self.state.collection(id).is_none() {
            return Ok(false);
        }

        self.state.active_id = Some(id);
        self.save()?;
        Ok(true)
    }

    /// Rename the active collection
    ///
    /// Returns false without saving when there is no active collection or
    /// the trimmed name is empty.
    pub fn rename_active(&mut self, new_name: &str) -> StoreResult<bool> {
        let name = new_name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let Some(id) = self.state.active_id else {
            return Ok(false);
        };
        let Some(collection) = self.state.collection_mut(id) else {
            return Ok(false);
        };

        collection.name = name.to_string();
        self.save()?;
        Ok(true)
    }

    /// Delete the active collection after confirmation
    ///
    /// `confirm` is asked with the collection about to be removed; returning
    /// false cancels. The first remaining collection becomes active.
    pub fn delete_active<F>(&mut self, confirm: F) -> StoreResult<Option<Collection>>
    where
        F: FnOnce(&Collection) -> bool,
    {
        let Some(active) = self.state.active() else {
            return Ok(None);
        };
        if !confirm(active) {
            return Ok(None);
        }

        let id = active.id;
        let Some(pos) = self.state.collections.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        let removed = self.state.collections.remove(pos);
        self.state.active_id = self.state.collections.first().map(|c| c.id);
        self.save()?;

        info!("Deleted collection {}", id);
        Ok(Some(removed))
    }

    // ==================== Link Operations ====================

    /// Add a link to a collection
    ///
    /// The new link is pending enrichment and goes first in the collection.
    /// An unparseable URL returns [`StoreError::InvalidUrl`] and leaves the
    /// state untouched.
    pub fn add_link(
        &mut self,
        collection_id: Uuid,
        raw_url: &str,
        custom_title: Option<&str>,
    ) -> StoreResult<Link> {
        let link = Link::parse(raw_url, custom_title).map_err(|source| StoreError::InvalidUrl {
            input: raw_url.trim().to_string(),
            source,
        })?;

        let collection = self
            .state
            .collection_mut(collection_id)
            .ok_or(StoreError::CollectionNotFound(collection_id))?;
        collection.links.insert(0, link.clone());
        self.save()?;

        debug!("Added link {} to collection {}", link.id, collection_id);
        Ok(link)
    }

    /// Add a link to the active collection
    pub fn add_link_to_active(
        &mut self,
        raw_url: &str,
        custom_title: Option<&str>,
    ) -> StoreResult<Link> {
        let id = self
            .active()
            .map(|c| c.id)
            .ok_or(StoreError::NoActiveCollection)?;
        self.add_link(id, raw_url, custom_title)
    }

    /// Apply a finished preview to the link with this ID
    ///
    /// The link is looked up in the current state; if it has been deleted
    /// along with its collection the outcome is dropped. The state is saved
    /// either way.
    pub fn apply_preview(
        &mut self,
        link_id: Uuid,
        outcome: &PreviewOutcome,
    ) -> StoreResult<ApplyOutcome> {
        let applied = match self.state.find_link_mut(link_id) {
            Some(link) => {
                outcome.apply_to(link);
                ApplyOutcome::Applied
            }
            None => {
                debug!("Dropping preview for missing link {}", link_id);
                ApplyOutcome::Orphaned
            }
        };

        self.save()?;
        Ok(applied)
    }

    // ==================== Persistence ====================

    /// Write the whole state to disk
    pub fn save(&self) -> StoreResult<()> {
        self.persistence.save(&self.state)?;
        Ok(())
    }

}

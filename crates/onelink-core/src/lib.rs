//! onelink Core Library
//!
//! This crate provides the core functionality for onelink, a local-first
//! organizer that groups links into named collections, fetches a rich
//! preview for every saved link, and exports a collection as a static
//! HTML page.
//!
//! # Architecture
//!
//! - **Store**: single owner of the state tree; every mutation is written
//!   through to disk as one JSON blob
//! - **Preview**: detached enrichment tasks that report back by link ID
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! let id = store.create_collection("Reading")?;
//! let link = store.add_link(id, "https://www.example.com/a", None)?;
//!
//! let client = PreviewClient::from_config(store.config())?;
//! let outcome = client.resolve(&link.url, &link.hostname).await;
//! store.apply_preview(link.id, &outcome)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Collection store (main entry point)
//! - `models`: Collections, links, and the state tree
//! - `preview`: Preview enrichment client
//! - `view`: Display data for collection lists and link grids
//! - `export`: Static HTML export
//! - `storage`: JSON slot persistence
//! - `config`: Application configuration

pub mod config;
pub mod export;
pub mod models;
pub mod preview;
pub mod storage;
pub mod store;
pub mod view;

pub use config::Config;
pub use export::ExportDocument;
pub use models::{AppState, Collection, Link, PreviewState};
pub use preview::{PreviewClient, PreviewCompletion, PreviewError, PreviewOutcome};
pub use storage::{LoadOutcome, StatePersistence, StorageError};
pub use store::{ApplyOutcome, Store, StoreError};
pub use view::{LinkCard, LinkGrid, Thumbnail};

//! Link command handlers

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::debug;

use onelink_core::view::LinkGrid;
use onelink_core::{PreviewClient, Store, StoreError};

use super::{resolve_collection, resolve_link};
use crate::output::Output;

/// Add a link and wait for its preview
///
/// The link is saved immediately as pending; the preview then runs on a
/// detached task and its outcome is applied by ID before returning.
pub async fn add(
    store: &mut Store,
    url: String,
    title: Option<String>,
    collection: Option<String>,
    output: &Output,
) -> Result<()> {
    let collection_id = match collection {
        Some(ident) => resolve_collection(store, &ident)?,
        None => store
            .active()
            .map(|c| c.id)
            .ok_or(StoreError::NoActiveCollection)?,
    };

    let link = store.add_link(collection_id, &url, title.as_deref())?;
    output.success(&format!("Added link: {}", link.url));

    let client = PreviewClient::from_config(store.config())?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .spawn(&link, tx)
        .await
        .context("Preview task failed")?;

    while let Some(completion) = rx.recv().await {
        let applied = store.apply_preview(completion.link_id, &completion.outcome)?;
        debug!("Preview for {}: {:?}", completion.link_id, applied);
    }

    match store.find_link(link.id) {
        Some(updated) => output.print_link(updated),
        None => output.print_link(&link),
    }
    Ok(())
}

/// List links in a collection (the active one by default)
pub fn list(store: &Store, collection: Option<String>, output: &Output) -> Result<()> {
    let target = match collection {
        Some(ident) => store.collection(resolve_collection(store, &ident)?),
        None => store.active(),
    };

    match target {
        Some(collection) => {
            if !output.is_json() && !output.is_quiet() {
                println!("{}\n", collection.name);
            }
            output.print_grid(&LinkGrid::for_collection(collection), &collection.links);
        }
        None => output.print_grid(&LinkGrid::NoCollection, &[]),
    }
    Ok(())
}

/// Show a single link
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_link(store, &id)?;
    let link = store
        .find_link(uuid)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    output.print_link(link);
    Ok(())
}

/// Open a link in the default browser
pub fn open(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_link(store, &id)?;
    let link = store
        .find_link(uuid)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    open::that_detached(&link.url).with_context(|| format!("Failed to open {}", link.url))?;
    output.success(&format!("Opened '{}'", link.title));
    Ok(())
}

//! Collection command handlers

use anyhow::{Context, Result};

use onelink_core::Store;

use super::resolve_collection;
use crate::output::Output;
use crate::prompt::{confirm, delete_prompt};

/// Create a collection and make it active
pub fn create(store: &mut Store, name: String, output: &Output) -> Result<()> {
    let id = store
        .create_collection(&name)
        .context("Failed to create collection")?;

    if let Some(collection) = store.collection(id) {
        output.success(&format!("Created collection '{}'", collection.name));
        output.print_collection(collection);
    }
    Ok(())
}

/// List all collections
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_collections(store.state());
    Ok(())
}

/// Switch the active collection
pub fn select(store: &mut Store, ident: String, output: &Output) -> Result<()> {
    let id = resolve_collection(store, &ident)?;
    store.set_active(id)?;

    if let Some(collection) = store.active() {
        output.success(&format!("Active collection: {}", collection.name));
    }
    Ok(())
}

/// Rename the active collection
pub fn rename(store: &mut Store, name: String, output: &Output) -> Result<()> {
    let old_name = store
        .active()
        .map(|c| c.name.clone())
        .ok_or(onelink_core::StoreError::NoActiveCollection)?;

    if store.rename_active(&name)? {
        output.success(&format!("Renamed '{}' to '{}'", old_name, name.trim()));
    } else {
        output.message("Name unchanged.");
    }
    Ok(())
}

/// Delete the active collection
pub fn delete(store: &mut Store, yes: bool, output: &Output) -> Result<()> {
    if store.active().is_none() {
        output.message("No active collection.");
        return Ok(());
    }

    let interactive = output.should_prompt();
    let removed = store.delete_active(|collection| {
        yes || (interactive && confirm(&delete_prompt(&collection.name)).unwrap_or(false))
    })?;

    match removed {
        Some(collection) => {
            output.success(&format!("Deleted collection '{}'", collection.name));
            if let Some(active) = store.active() {
                output.message(&format!("Active collection: {}", active.name));
            }
        }
        None if !yes && !interactive => {
            output.message("Not deleted. Pass --yes to delete without a prompt.");
        }
        None => output.message("Cancelled."),
    }
    Ok(())
}

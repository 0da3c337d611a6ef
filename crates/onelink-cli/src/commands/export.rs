//! Export command handler

use std::path::PathBuf;

use anyhow::{Context, Result};

use onelink_core::{ExportDocument, Store, StoreError};

use crate::output::{Output, OutputFormat};

/// Export the active collection as a static HTML page
pub fn run(store: &Store, dir: Option<PathBuf>, output: &Output) -> Result<()> {
    let collection = store.active().ok_or(StoreError::NoActiveCollection)?;
    let dir = dir.unwrap_or_else(|| store.config().export_path());

    let document = ExportDocument::from_collection(collection);
    let path = document
        .write_to(&dir)
        .context("Failed to write export")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "collection": collection.id,
                    "links": collection.link_count(),
                    "path": path,
                })
            );
        }
        OutputFormat::Quiet => println!("{}", path.display()),
        OutputFormat::Human => {
            output.success(&format!(
                "Exported '{}' ({} links) to {}",
                collection.name,
                collection.link_count(),
                path.display()
            ));
        }
    }
    Ok(())
}

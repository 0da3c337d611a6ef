//! Command handlers

pub mod collection;
pub mod config;
pub mod export;
pub mod link;
pub mod status;

use anyhow::{bail, Result};
use uuid::Uuid;

use onelink_core::Store;

/// Resolve a collection by full UUID, ID prefix, or exact name
pub fn resolve_collection(store: &Store, ident: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(ident) {
        if store.collection(uuid).is_some() {
            return Ok(uuid);
        }
        bail!("No collection found matching: {}", ident);
    }

    let by_name: Vec<_> = store
        .collections()
        .iter()
        .filter(|c| c.name == ident)
        .collect();
    if by_name.len() == 1 {
        return Ok(by_name[0].id);
    }

    let by_prefix: Vec<_> = store
        .collections()
        .iter()
        .filter(|c| c.id.to_string().starts_with(ident))
        .collect();

    match (by_name.len(), by_prefix.len()) {
        (0, 0) => bail!("No collection found matching: {}", ident),
        (0, 1) => Ok(by_prefix[0].id),
        _ => {
            eprintln!("Multiple collections match '{}':", ident);
            for collection in by_name.iter().chain(by_prefix.iter()) {
                eprintln!("  {} - {}", collection.id, collection.name);
            }
            bail!("Ambiguous collection. Please provide more of the ID.");
        }
    }
}

/// Resolve a link by full UUID or ID prefix, searching every collection
pub fn resolve_link(store: &Store, ident: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(ident) {
        return Ok(uuid);
    }

    let matches: Vec<_> = store
        .collections()
        .iter()
        .flat_map(|c| c.links.iter())
        .filter(|l| l.id.to_string().starts_with(ident))
        .collect();

    match matches.len() {
        0 => bail!("No link found matching: {}", ident),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple links match '{}':", ident);
            for link in &matches {
                eprintln!("  {} - {}", link.id, link.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

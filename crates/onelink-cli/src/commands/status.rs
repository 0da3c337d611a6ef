//! Status command handler

use anyhow::Result;

use onelink_core::Store;

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let persistence = store.persistence();
    let active = store.active();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage": {
                        "path": persistence.path(),
                        "exists": persistence.exists(),
                        "size": persistence.file_size()
                    },
                    "counts": {
                        "collections": store.collections().len(),
                        "links": store.state().link_count()
                    },
                    "active": active.map(|c| serde_json::json!({
                        "id": c.id,
                        "name": c.name,
                        "links": c.link_count()
                    })),
                    "preview_endpoint": config.preview_endpoint
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(collection) = active {
                println!("{}", collection.id);
            }
        }
        OutputFormat::Human => {
            println!("onelink Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  Location: {}", persistence.path().display());
            println!("  Size:     {}", format_size(persistence.file_size()));
            println!();
            println!("Contents:");
            println!("  Collections: {}", store.collections().len());
            println!("  Links:       {}", store.state().link_count());
            println!();
            match active {
                Some(collection) => println!(
                    "Active: {} ({} links)",
                    collection.name,
                    collection.link_count()
                ),
                None => println!("Active: (none)"),
            }
            println!("Previews: {}", config.preview_endpoint);
        }
    }

    Ok(())
}

/// Human-readable byte size
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}

//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use onelink_core::view::{collection_list, CollectionSummary, LinkCard, LinkGrid, Thumbnail};
use onelink_core::{AppState, Collection, Link};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is JSON
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print the collection list, marking the active one
    pub fn print_collections(&self, state: &AppState) {
        let summaries = collection_list(state);
        match self.format {
            OutputFormat::Human => {
                if summaries.is_empty() {
                    println!("No collections yet. Create one with `onelink collection new <name>`.");
                    return;
                }
                for summary in &summaries {
                    println!("{}", format_summary(summary));
                }
                println!("\n{} collection(s)", summaries.len());
            }
            OutputFormat::Json => {
                let json: Vec<_> = summaries
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "id": s.id,
                            "name": s.name,
                            "links": s.link_count,
                            "active": s.active,
                        })
                    })
                    .collect();
                print_json(&json);
            }
            OutputFormat::Quiet => {
                for summary in &summaries {
                    println!("{}", summary.id);
                }
            }
        }
    }

    /// Print a single collection header
    pub fn print_collection(&self, collection: &Collection) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", collection.id);
                println!("Name:    {}", collection.name);
                println!("Links:   {}", collection.link_count());
                println!(
                    "Created: {}",
                    collection.created_at.format("%Y-%m-%d %H:%M")
                );
            }
            OutputFormat::Json => print_json(collection),
            OutputFormat::Quiet => println!("{}", collection.id),
        }
    }

    /// Print a single link
    pub fn print_link(&self, link: &Link) {
        match self.format {
            OutputFormat::Human => {
                let card = LinkCard::from_link(link);
                println!("ID:       {}", link.id);
                println!("Title:    {}", card.title);
                println!("URL:      {}", card.url);
                println!("Host:     {}", link.hostname);
                match &card.thumbnail {
                    Thumbnail::Image(src) => println!("Preview:  {}", src),
                    Thumbnail::Placeholder(glyph) => println!("Preview:  [{}]", glyph),
                }
                println!("Status:   {}", card.note);
                println!("Added:    {}", link.added_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => print_json(link),
            OutputFormat::Quiet => println!("{}", link.id),
        }
    }

    /// Print the link grid for a collection
    pub fn print_grid(&self, grid: &LinkGrid, links: &[Link]) {
        match self.format {
            OutputFormat::Human => {
                if let Some(message) = grid.message() {
                    println!("{}", message);
                    return;
                }
                for card in grid.cards() {
                    println!(
                        "{} | {} | {} | {}",
                        &card.id.to_string()[..8],
                        truncate(&card.title, 30),
                        truncate(&card.url, 40),
                        card.note
                    );
                }
                println!("\n{} link(s)", grid.cards().len());
            }
            OutputFormat::Json => print_json(links),
            OutputFormat::Quiet => {
                for card in grid.cards() {
                    println!("{}", card.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// One line of the human collection list
fn format_summary(summary: &CollectionSummary) -> String {
    let marker = if summary.active { "*" } else { " " };
    format!(
        "{} {} | {} | {}",
        marker,
        &summary.id.to_string()[..8],
        summary.name,
        summary.meta()
    )
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_format_summary() {
        let id = Uuid::parse_str("12345678-1234-1234-1234-123456789abc").unwrap();
        let summary = CollectionSummary {
            id,
            name: "Reading".to_string(),
            link_count: 2,
            active: true,
        };
        assert_eq!(format_summary(&summary), "* 12345678 | Reading | 2 links");

        let inactive = CollectionSummary {
            active: false,
            ..summary
        };
        assert!(format_summary(&inactive).starts_with("  12345678"));
    }
}

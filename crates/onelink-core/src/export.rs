//! Static HTML export
//!
//! Renders one collection as a self-contained page: inline CSS, no scripts,
//! and no external assets other than the preview images themselves.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::{Collection, Link};
use crate::storage::{StorageError, StorageResult};
use crate::view::placeholder_glyph;

const STYLE: &str = "\
body{font-family:Inter,system-ui,sans-serif;background:#070b14;color:#e2e8f0;margin:0;padding:1rem}
main{max-width:1000px;margin:auto}.top{margin-bottom:1rem}h1{margin:.2rem 0}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:.8rem}
.card{text-decoration:none;color:inherit;border:1px solid #334155;border-radius:12px;overflow:hidden;background:#0f172a;display:block}
img,.ph{width:100%;height:120px;object-fit:cover;display:grid;place-items:center;background:linear-gradient(120deg,#172554,#0f766e);font-size:2rem}
.ct{padding:.6rem}.ct h3{margin:0 0 .3rem;font-size:1rem}\
.ct p{margin:0;color:#94a3b8;font-size:.82rem;white-space:nowrap;overflow:hidden;text-overflow:ellipsis}
small{color:#94a3b8}
";

/// Paragraph used for a collection with no links
pub const EMPTY_EXPORT_MESSAGE: &str = "No links in this collection.";

/// A rendered export, ready to be written
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub html: String,
}

impl ExportDocument {
    pub fn from_collection(collection: &Collection) -> Self {
        Self {
            filename: export_filename(&collection.name),
            html: render_collection(collection),
        }
    }

    /// Write the page into `dir`, returning the full path
    pub fn write_to(&self, dir: &Path) -> StorageResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| StorageError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(&self.filename);
        fs::write(&path, &self.html).map_err(|e| StorageError::from_io(e, path.clone()))?;

        info!("Exported collection to {:?}", path);
        Ok(path)
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// File name for an exported collection
///
/// Lowercased, whitespace runs become `-`, path separators are replaced,
/// and an empty result falls back to `collection`.
pub fn export_filename(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        slug.push(if c == '/' || c == '\\' { '-' } else { c });
    }

    if slug.is_empty() {
        slug.push_str("collection");
    }
    format!("{}.html", slug)
}

fn render_card(link: &Link) -> String {
    let image = if link.has_preview_image() {
        format!(
            r#"<img src="{}" alt="{}" />"#,
            escape_html(&link.preview_image),
            escape_html(&link.title)
        )
    } else {
        format!(
            r#"<div class="ph">{}</div>"#,
            escape_html(&placeholder_glyph(&link.hostname))
        )
    };

    format!(
        r#"
      <a class="card" href="{url}" target="_blank" rel="noopener noreferrer">
        {image}
        <div class="ct">
          <h3>{title}</h3>
          <p>{url}</p>
        </div>
      </a>"#,
        url = escape_html(&link.url),
        image = image,
        title = escape_html(&link.title),
    )
}

/// Render a collection as a complete HTML page
pub fn render_collection(collection: &Collection) -> String {
    let cards: String = collection.links.iter().map(render_card).collect();
    let body = if cards.is_empty() {
        format!("<p>{}</p>", EMPTY_EXPORT_MESSAGE)
    } else {
        cards
    };
    let name = escape_html(&collection.name);

    format!(
        r#"<!doctype html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{name} • onelink export</title>
<style>
{style}</style></head><body><main><div class="top"><small>Exported with onelink</small><h1>{name}</h1></div><section class="grid">{body}</section></main></body></html>"#,
        name = name,
        style = STYLE,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};
    use tempfile::TempDir;

    fn collection_with(name: &str, urls: &[(&str, Option<&str>)]) -> Collection {
        let mut collection = Collection::new(name);
        for (url, title) in urls {
            collection.links.push(Link::parse(url, *title).unwrap());
        }
        collection
    }

    fn select<'a>(doc: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(selector).unwrap();
        doc.select(&selector).collect()
    }

    #[test]
    fn test_one_card_per_link() {
        let collection = collection_with(
            "Reading",
            &[
                ("https://a.com", None),
                ("https://b.com", Some("B")),
                ("https://c.com", None),
            ],
        );
        let doc = Html::parse_document(&render_collection(&collection));

        let cards = select(&doc, "a.card");
        assert_eq!(cards.len(), 3);
        for card in &cards {
            assert_eq!(card.value().attr("target"), Some("_blank"));
            assert_eq!(card.value().attr("rel"), Some("noopener noreferrer"));
        }
        assert_eq!(cards[0].value().attr("href"), Some("https://a.com/"));
        assert!(select(&doc, "script").is_empty());
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut collection = collection_with(
            "<b>Tom & Jerry's</b>",
            &[("https://example.com/?q=1&r=2", Some("<script>alert(\"x\")</script>"))],
        );
        collection.links[0].preview_image = "https://img.example.com/a.png?x=1&y=\"2\"".to_string();

        let html = render_collection(&collection);
        assert!(!html.contains("<script"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("Tom &amp; Jerry&#039;s"));
        assert!(html.contains("q=1&amp;r=2"));

        let doc = Html::parse_document(&html);
        let titles = select(&doc, ".ct h3");
        assert_eq!(
            titles[0].text().collect::<String>(),
            "<script>alert(\"x\")</script>"
        );
        let heading = select(&doc, "h1");
        assert_eq!(heading[0].text().collect::<String>(), "<b>Tom & Jerry's</b>");
        let img = select(&doc, "img");
        assert_eq!(
            img[0].value().attr("src"),
            Some("https://img.example.com/a.png?x=1&y=\"2\"")
        );
        assert_eq!(select(&doc, "a.card").len(), 1);
    }

    #[test]
    fn test_placeholder_without_image() {
        let collection = collection_with("Links", &[("https://www.rust-lang.org", None)]);
        let doc = Html::parse_document(&render_collection(&collection));

        let placeholders = select(&doc, ".ph");
        assert_eq!(placeholders.len(), 1);
        assert_eq!(placeholders[0].text().collect::<String>(), "R");
        assert!(select(&doc, "img").is_empty());
    }

    #[test]
    fn test_empty_collection() {
        let collection = Collection::new("Nothing");
        let doc = Html::parse_document(&render_collection(&collection));

        assert!(select(&doc, "a.card").is_empty());
        let paragraphs = select(&doc, "section.grid p");
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(
            paragraphs[0].text().collect::<String>(),
            EMPTY_EXPORT_MESSAGE
        );
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("Reading"), "reading.html");
        assert_eq!(export_filename("My  Cool\tLinks"), "my-cool-links.html");
        assert_eq!(export_filename(" padded "), "-padded-.html");
        assert_eq!(export_filename(""), "collection.html");
        assert_eq!(export_filename("a/b\\c"), "a-b-c.html");
    }

    #[test]
    fn test_write_to() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("exports");
        let collection = collection_with("Weekend Reads", &[("https://a.com", None)]);

        let document = ExportDocument::from_collection(&collection);
        let path = document.write_to(&out_dir).unwrap();

        assert_eq!(path, out_dir.join("weekend-reads.html"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, document.html);
    }
}

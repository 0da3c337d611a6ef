//! Data models for onelink
//!
//! Defines the core data structures: Collection, Link, and the AppState
//! tree that is persisted as a single blob.
//!
//! Field names serialize in camelCase so the stored JSON reads
//! `{"collections": [...], "activeId": ...}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;
use uuid::Uuid;

/// Note shown while a preview request is in flight
pub const PENDING_NOTE: &str = "Fetching preview…";

/// Note shown when the preview service answered without a publisher
pub const LIVE_NOTE: &str = "Live preview available";

/// Note shown when the preview request failed
pub const FALLBACK_NOTE: &str = "Fallback preview";

/// Where a link sits in its preview lifecycle
///
/// `Pending` moves to exactly one of the other two states and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Pending,
    Enriched,
    Fallback,
}

/// A saved link with preview metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Unique identifier
    pub id: Uuid,
    /// Canonical absolute URL
    pub url: String,
    /// Display title (defaults to the hostname)
    pub title: String,
    /// Hostname without a leading `www.`
    pub hostname: String,
    /// When this link was added
    pub added_at: DateTime<Utc>,
    /// Preview image URL, empty when there is none yet
    #[serde(default)]
    pub preview_image: String,
    /// Human-readable preview status
    #[serde(default)]
    pub preview_note: String,
}

impl Link {
    /// Parse a raw URL into a new pending link
    ///
    /// The input is trimmed and must be an absolute URL. A blank custom
    /// title falls back to the hostname.
    pub fn parse(raw_url: &str, custom_title: Option<&str>) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(raw_url.trim())?;
        let hostname = display_hostname(&parsed);

        let title = custom_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| hostname.clone());

        Ok(Self {
            id: Uuid::new_v4(),
            url: parsed.to_string(),
            title,
            hostname,
            added_at: Utc::now(),
            preview_image: String::new(),
            preview_note: PENDING_NOTE.to_string(),
        })
    }

    /// Current preview state, derived from the status note
    pub fn preview_state(&self) -> PreviewState {
        match self.preview_note.as_str() {
            PENDING_NOTE => PreviewState::Pending,
            FALLBACK_NOTE => PreviewState::Fallback,
            _ => PreviewState::Enriched,
        }
    }

    /// Whether a preview image has been set
    pub fn has_preview_image(&self) -> bool {
        !self.preview_image.is_empty()
    }
}

/// Hostname of a URL as shown to users (leading `www.` removed)
pub fn display_hostname(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

/// A named, ordered group of links
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// When this collection was created
    pub created_at: DateTime<Utc>,
    /// Links, newest first
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Collection {
    /// Create an empty collection with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            links: Vec::new(),
        }
    }

    /// Number of links in this collection
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Find a link by ID
    pub fn link(&self, id: Uuid) -> Option<&Link> {
        self.links.iter().find(|l| l.id == id)
    }
}

/// The whole persisted state tree
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Collections, newest first
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Currently selected collection
    #[serde(default, deserialize_with = "lenient_active_id")]
    pub active_id: Option<Uuid>,
}

/// Read `activeId` without failing the whole state
///
/// Anything that is not a UUID string loads as `None` and is repaired by
/// [`AppState::normalize_active`].
fn lenient_active_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok()))
}

impl AppState {
    /// Get a collection by ID
    pub fn collection(&self, id: Uuid) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Get a mutable collection by ID
    pub fn collection_mut(&mut self, id: Uuid) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }

    /// Get the active collection, if any
    pub fn active(&self) -> Option<&Collection> {
        self.active_id.and_then(|id| self.collection(id))
    }

    /// Find a link anywhere in the state
    pub fn find_link(&self, id: Uuid) -> Option<&Link> {
        self.collections.iter().find_map(|c| c.link(id))
    }

    /// Find a mutable link anywhere in the state
    pub fn find_link_mut(&mut self, id: Uuid) -> Option<&mut Link> {
        self.collections
            .iter_mut()
            .flat_map(|c| c.links.iter_mut())
            .find(|l| l.id == id)
    }

    /// Repair `active_id` so it never dangles
    ///
    /// A missing or unknown active ID selects the first collection (or none
    /// when empty). Returns true if the active ID changed.
    pub fn normalize_active(&mut self) -> bool {
        let valid = self
            .active_id
            .is_some_and(|id| self.collections.iter().any(|c| c.id == id));
        if valid {
            return false;
        }

        let first = self.collections.first().map(|c| c.id);
        let changed = self.active_id != first;
        self.active_id = first;
        changed
    }

    /// Total number of links across all collections
    pub fn link_count(&self) -> usize {
        self.collections.iter().map(Collection::link_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_parse_defaults_title_to_hostname() {
        let link = Link::parse("https://www.example.com/a", None).unwrap();
        assert_eq!(link.url, "https://www.example.com/a");
        assert_eq!(link.hostname, "example.com");
        assert_eq!(link.title, "example.com");
        assert!(link.preview_image.is_empty());
        assert_eq!(link.preview_note, PENDING_NOTE);
        assert_eq!(link.preview_state(), PreviewState::Pending);
    }

    #[test]
    fn test_link_parse_custom_title() {
        let link = Link::parse("https://rust-lang.org", Some("  Rust  ")).unwrap();
        assert_eq!(link.title, "Rust");

        let blank = Link::parse("https://rust-lang.org", Some("   ")).unwrap();
        assert_eq!(blank.title, "rust-lang.org");
    }

    #[test]
    fn test_link_parse_canonicalizes_url() {
        let link = Link::parse("  HTTPS://Example.COM  ", None).unwrap();
        assert_eq!(link.url, "https://example.com/");
        assert_eq!(link.hostname, "example.com");
    }

    #[test]
    fn test_link_parse_rejects_relative() {
        assert!(Link::parse("example.com", None).is_err());
        assert!(Link::parse("", None).is_err());
        assert!(Link::parse("not a url", None).is_err());
    }

    #[test]
    fn test_hostname_only_strips_leading_www() {
        let link = Link::parse("https://docs.www.example.com", None).unwrap();
        assert_eq!(link.hostname, "docs.www.example.com");
    }

    #[test]
    fn test_link_without_host() {
        let link = Link::parse("mailto:someone@example.com", None).unwrap();
        assert_eq!(link.hostname, "");
        assert_eq!(link.title, "");
    }

    #[test]
    fn test_preview_state_from_note() {
        let mut link = Link::parse("https://example.com", None).unwrap();
        link.preview_note = FALLBACK_NOTE.to_string();
        assert_eq!(link.preview_state(), PreviewState::Fallback);

        link.preview_note = "Source: Example".to_string();
        assert_eq!(link.preview_state(), PreviewState::Enriched);

        link.preview_note = LIVE_NOTE.to_string();
        assert_eq!(link.preview_state(), PreviewState::Enriched);
    }

    #[test]
    fn test_normalize_active() {
        let mut state = AppState::default();
        assert!(!state.normalize_active());
        assert!(state.active_id.is_none());

        let first = Collection::new("First");
        let second = Collection::new("Second");
        let first_id = first.id;
        state.collections = vec![first, second];

        assert!(state.normalize_active());
        assert_eq!(state.active_id, Some(first_id));

        // Dangling ID is repaired
        state.active_id = Some(Uuid::new_v4());
        assert!(state.normalize_active());
        assert_eq!(state.active_id, Some(first_id));
    }

    #[test]
    fn test_find_link_across_collections() {
        let mut state = AppState::default();
        let mut a = Collection::new("A");
        let b = Collection::new("B");
        let link = Link::parse("https://example.com", None).unwrap();
        let link_id = link.id;
        a.links.push(link);
        state.collections = vec![b, a];

        assert!(state.find_link(link_id).is_some());
        state.find_link_mut(link_id).unwrap().title = "Changed".to_string();
        assert_eq!(state.find_link(link_id).unwrap().title, "Changed");
        assert_eq!(state.link_count(), 1);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut collection = Collection::new("Reading");
        collection
            .links
            .push(Link::parse("https://example.com", None).unwrap());
        let state = AppState {
            active_id: Some(collection.id),
            collections: vec![collection],
        };

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"activeId\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"addedAt\""));
        assert!(json.contains("\"previewImage\""));
        assert!(json.contains("\"previewNote\""));

        let parsed: AppState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_state_null_active_id() {
        let parsed: AppState =
            serde_json::from_str(r#"{"collections": [], "activeId": null}"#).unwrap();
        assert!(parsed.collections.is_empty());
        assert!(parsed.active_id.is_none());
    }

    #[test]
    fn test_state_invalid_active_id_loads_as_none() {
        let collection = Collection::new("Reading");
        let collections = serde_json::to_string(&vec![collection.clone()]).unwrap();

        for active in [r#""abc123""#, "42", "{}", "[]"] {
            let json = format!(r#"{{"collections": {}, "activeId": {}}}"#, collections, active);
            let mut parsed: AppState = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.collections, vec![collection.clone()]);
            assert!(parsed.active_id.is_none());

            assert!(parsed.normalize_active());
            assert_eq!(parsed.active_id, Some(collection.id));
        }
    }
}

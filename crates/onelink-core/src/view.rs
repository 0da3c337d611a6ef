//! Presentation model
//!
//! Turns the state tree into plain display data: the collection list, the
//! link grid (or its empty-state message), and per-link thumbnails. Both the
//! TUI and the CLI render from these types.

use uuid::Uuid;

use crate::models::{AppState, Collection, Link};

/// Shown when no collection is selected
pub const NO_COLLECTION_MESSAGE: &str = "Create your first collection to start adding links.";

/// Shown when the active collection has no links
pub const NO_LINKS_MESSAGE: &str = "No links yet. Add your first URL above.";

/// Heading used when nothing is active
pub const NO_ACTIVE_HEADING: &str = "Choose a collection";

/// Glyph used when a link has no hostname to abbreviate
pub const PLACEHOLDER_GLYPH: &str = "🔗";

/// One row of the collection list
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    pub id: Uuid,
    pub name: String,
    pub link_count: usize,
    pub active: bool,
}

impl CollectionSummary {
    /// Secondary text under the name, e.g. `3 links`
    pub fn meta(&self) -> String {
        format!("{} links", self.link_count)
    }
}

/// Summaries of every collection, in stored order
pub fn collection_list(state: &AppState) -> Vec<CollectionSummary> {
    state
        .collections
        .iter()
        .map(|c| CollectionSummary {
            id: c.id,
            name: c.name.clone(),
            link_count: c.link_count(),
            active: state.active_id == Some(c.id),
        })
        .collect()
}

/// Heading above the link grid
pub fn heading(state: &AppState) -> &str {
    state
        .active()
        .map(|c| c.name.as_str())
        .unwrap_or(NO_ACTIVE_HEADING)
}

/// What stands in for a link's preview image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    /// Remote preview image URL
    Image(String),
    /// Single character placeholder
    Placeholder(String),
}

impl Thumbnail {
    pub fn for_link(link: &Link) -> Self {
        if link.has_preview_image() {
            Thumbnail::Image(link.preview_image.clone())
        } else {
            Thumbnail::Placeholder(placeholder_glyph(&link.hostname))
        }
    }
}

/// Uppercased first character of the hostname, or the link glyph
pub fn placeholder_glyph(hostname: &str) -> String {
    match hostname.chars().next() {
        Some(c) => c.to_uppercase().collect(),
        None => PLACEHOLDER_GLYPH.to_string(),
    }
}

/// Display data for one link
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCard {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    /// Preview status, or the hostname when there is none
    pub note: String,
    pub thumbnail: Thumbnail,
}

impl LinkCard {
    pub fn from_link(link: &Link) -> Self {
        let note = if link.preview_note.is_empty() {
            link.hostname.clone()
        } else {
            link.preview_note.clone()
        };

        Self {
            id: link.id,
            title: link.title.clone(),
            url: link.url.clone(),
            note,
            thumbnail: Thumbnail::for_link(link),
        }
    }
}

/// Contents of the link pane
#[derive(Debug, Clone, PartialEq)]
pub enum LinkGrid {
    /// No collection is active
    NoCollection,
    /// The active collection is empty
    Empty,
    /// Cards for the active collection, newest first
    Cards(Vec<LinkCard>),
}

impl LinkGrid {
    pub fn for_state(state: &AppState) -> Self {
        match state.active() {
            None => LinkGrid::NoCollection,
            Some(collection) => Self::for_collection(collection),
        }
    }

    pub fn for_collection(collection: &Collection) -> Self {
        if collection.links.is_empty() {
            LinkGrid::Empty
        } else {
            LinkGrid::Cards(collection.links.iter().map(LinkCard::from_link).collect())
        }
    }

    /// Empty-state message, if the grid has no cards
    pub fn message(&self) -> Option<&'static str> {
        match self {
            LinkGrid::NoCollection => Some(NO_COLLECTION_MESSAGE),
            LinkGrid::Empty => Some(NO_LINKS_MESSAGE),
            LinkGrid::Cards(_) => None,
        }
    }

    pub fn cards(&self) -> &[LinkCard] {
        match self {
            LinkGrid::Cards(cards) => cards,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(collections: Vec<Collection>, active: Option<usize>) -> AppState {
        let active_id = active.map(|i| collections[i].id);
        AppState {
            collections,
            active_id,
        }
    }

    #[test]
    fn test_collection_list_marks_active() {
        let mut reading = Collection::new("Reading");
        reading
            .links
            .push(Link::parse("https://example.com", None).unwrap());
        let tools = Collection::new("Tools");
        let state = state_with(vec![tools, reading], Some(1));

        let list = collection_list(&state);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Tools");
        assert!(!list[0].active);
        assert_eq!(list[0].meta(), "0 links");
        assert!(list[1].active);
        assert_eq!(list[1].meta(), "1 links");
    }

    #[test]
    fn test_grid_without_active_collection() {
        let state = state_with(vec![], None);
        let grid = LinkGrid::for_state(&state);

        assert_eq!(grid, LinkGrid::NoCollection);
        assert_eq!(grid.message(), Some(NO_COLLECTION_MESSAGE));
        assert_eq!(heading(&state), NO_ACTIVE_HEADING);
    }

    #[test]
    fn test_grid_for_empty_collection() {
        let state = state_with(vec![Collection::new("Empty")], Some(0));
        let grid = LinkGrid::for_state(&state);

        assert_eq!(grid, LinkGrid::Empty);
        assert_eq!(grid.message(), Some(NO_LINKS_MESSAGE));
        assert!(grid.cards().is_empty());
        assert_eq!(heading(&state), "Empty");
    }

    #[test]
    fn test_cards_keep_order() {
        let mut collection = Collection::new("Links");
        let newer = Link::parse("https://newer.com", None).unwrap();
        let older = Link::parse("https://older.com", None).unwrap();
        collection.links = vec![newer.clone(), older.clone()];
        let state = state_with(vec![collection], Some(0));

        let grid = LinkGrid::for_state(&state);
        assert!(grid.message().is_none());
        let ids: Vec<_> = grid.cards().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[test]
    fn test_thumbnail() {
        let mut link = Link::parse("https://www.example.com", None).unwrap();
        assert_eq!(
            Thumbnail::for_link(&link),
            Thumbnail::Placeholder("E".to_string())
        );

        link.preview_image = "https://cdn.example.com/og.png".to_string();
        assert_eq!(
            Thumbnail::for_link(&link),
            Thumbnail::Image("https://cdn.example.com/og.png".to_string())
        );
    }

    #[test]
    fn test_placeholder_glyph() {
        assert_eq!(placeholder_glyph("rust-lang.org"), "R");
        assert_eq!(placeholder_glyph("ßtraße.de"), "SS");
        assert_eq!(placeholder_glyph(""), PLACEHOLDER_GLYPH);
    }

    #[test]
    fn test_card_note_falls_back_to_hostname() {
        let mut link = Link::parse("https://example.com/page", Some("Page")).unwrap();
        link.preview_note = String::new();

        let card = LinkCard::from_link(&link);
        assert_eq!(card.title, "Page");
        assert_eq!(card.url, "https://example.com/page");
        assert_eq!(card.note, "example.com");
    }
}

//! Link preview enrichment
//!
//! After a link is added, its preview is fetched out-of-band from a
//! metadata service. The request is made exactly once; any failure
//! (transport, timeout, bad status, malformed body) resolves to a
//! deterministic favicon fallback instead of an error.
//!
//! Completion is reported by link ID so the owner of the state can look
//! the link up again before applying anything. See
//! [`Store::apply_preview`](crate::store::Store::apply_preview).

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Link, FALLBACK_NOTE, LIVE_NOTE};

/// Errors from a single preview request
#[derive(Error, Debug)]
pub enum PreviewError {
    /// A configured endpoint is not a valid URL
    #[error("Invalid preview endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network failure or timeout
    #[error("Preview request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Preview service returned {0}")]
    Status(reqwest::StatusCode),

    /// The body was not the expected JSON
    #[error("Malformed preview response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fields extracted from a preview response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewMetadata {
    pub title: Option<String>,
    pub image: Option<String>,
    pub publisher: Option<String>,
}

/// Terminal result of enriching one link
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// The service answered; fields may still be absent
    Enriched(PreviewMetadata),
    /// The request failed; use the favicon image
    Fallback { image: String },
}

impl PreviewOutcome {
    /// Apply this outcome to a link
    ///
    /// An existing non-empty title is never replaced, and an image is only
    /// adopted when it is a complete absolute URL.
    pub fn apply_to(&self, link: &mut Link) {
        match self {
            PreviewOutcome::Enriched(meta) => {
                if let Some(title) = &meta.title {
                    if link.title.is_empty() {
                        link.title = title.clone();
                    }
                }
                if let Some(image) = &meta.image {
                    if Url::parse(image).is_ok() {
                        link.preview_image = image.clone();
                    }
                }
                link.preview_note = match &meta.publisher {
                    Some(publisher) => format!("Source: {}", publisher),
                    None => LIVE_NOTE.to_string(),
                };
            }
            PreviewOutcome::Fallback { image } => {
                link.preview_image = image.clone();
                link.preview_note = FALLBACK_NOTE.to_string();
            }
        }
    }

    /// Whether this is the fallback branch
    pub fn is_fallback(&self) -> bool {
        matches!(self, PreviewOutcome::Fallback { .. })
    }
}

/// Message sent when a detached preview task finishes
#[derive(Debug, Clone)]
pub struct PreviewCompletion {
    pub link_id: Uuid,
    pub outcome: PreviewOutcome,
}

#[derive(Debug, Deserialize)]
struct PreviewResponse {
    #[serde(default)]
    data: Option<PreviewData>,
}

#[derive(Debug, Deserialize)]
struct PreviewData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    image: Option<PreviewImage>,
    #[serde(default)]
    publisher: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    #[serde(default)]
    url: Option<String>,
}

/// Parse a preview service body
///
/// Blank strings are treated as absent.
fn parse_preview_body(body: &str) -> Result<PreviewMetadata, PreviewError> {
    let response: PreviewResponse = serde_json::from_str(body)?;
    let Some(data) = response.data else {
        return Ok(PreviewMetadata::default());
    };

    let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

    Ok(PreviewMetadata {
        title: non_blank(data.title),
        image: non_blank(data.image.and_then(|i| i.url)),
        publisher: non_blank(data.publisher),
    })
}

/// Client for the preview and favicon services
#[derive(Debug, Clone)]
pub struct PreviewClient {
    http: reqwest::Client,
    endpoint: Url,
    favicon_endpoint: Url,
}

impl PreviewClient {
    /// Create a client for explicit endpoints
    pub fn new(
        endpoint: Url,
        favicon_endpoint: Url,
        timeout: Duration,
    ) -> Result<Self, PreviewError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("onelink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(PreviewError::Client)?;

        Ok(Self {
            http,
            endpoint,
            favicon_endpoint,
        })
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Result<Self, PreviewError> {
        let endpoint = parse_endpoint(&config.preview_endpoint)?;
        let favicon_endpoint = parse_endpoint(&config.favicon_endpoint)?;
        Self::new(
            endpoint,
            favicon_endpoint,
            Duration::from_secs(config.preview_timeout_secs),
        )
    }

    /// Request URL for a link's metadata
    pub fn request_url(&self, link_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("url", link_url)
            .append_pair("meta", "true")
            .append_pair("screenshot", "true");
        url
    }

    /// Deterministic favicon URL for a hostname
    pub fn favicon_url(&self, hostname: &str) -> String {
        let mut url = self.favicon_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("domain", hostname)
            .append_pair("sz", "128");
        url.to_string()
    }

    /// Fetch metadata for a link URL
    pub async fn fetch(&self, link_url: &str) -> Result<PreviewMetadata, PreviewError> {
        let request_url = self.request_url(link_url);
        debug!("Fetching preview from {}", request_url);

        let response = self
            .http
            .get(request_url)
            .send()
            .await
            .map_err(PreviewError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PreviewError::Status(status));
        }

        let body = response.text().await.map_err(PreviewError::Transport)?;
        parse_preview_body(&body)
    }

    /// Fetch metadata, falling back to the favicon on any failure
    pub async fn resolve(&self, link_url: &str, hostname: &str) -> PreviewOutcome {
        match self.fetch(link_url).await {
            Ok(meta) => PreviewOutcome::Enriched(meta),
            Err(e) => {
                warn!("Preview for {} fell back to favicon: {}", link_url, e);
                PreviewOutcome::Fallback {
                    image: self.favicon_url(hostname),
                }
            }
        }
    }

    /// Enrich a link on a detached task
    ///
    /// The task owns copies of the URL and hostname only; the result is
    /// sent as a [`PreviewCompletion`] keyed by the link's ID. A dropped
    /// receiver is not an error.
    pub fn spawn(
        &self,
        link: &Link,
        tx: mpsc::UnboundedSender<PreviewCompletion>,
    ) -> JoinHandle<()> {
        let client = self.clone();
        let link_id = link.id;
        let url = link.url.clone();
        let hostname = link.hostname.clone();

        tokio::spawn(async move {
            let outcome = client.resolve(&url, &hostname).await;
            if tx.send(PreviewCompletion { link_id, outcome }).is_err() {
                debug!("Preview for {} finished after receiver closed", link_id);
            }
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, PreviewError> {
    Url::parse(endpoint).map_err(|source| PreviewError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        source,
    })
}

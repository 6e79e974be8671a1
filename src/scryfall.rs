//! Scryfall card database client.
//!
//! Two lookup pathways: the bulk `/cards/collection` endpoint for exact
//! batched name matches, and the `/cards/search` endpoint as a fuzzy
//! relevance-ranked fallback. The [`CardLookup`] trait is the seam the
//! resolver works against, so tests can substitute an in-memory card table.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One card as the resolver needs it: canonical name plus color identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(default)]
    pub color_identity: Vec<String>,
}

/// Result of one bulk collection lookup.
#[derive(Debug, Clone, Default)]
pub struct CollectionPage {
    /// Exact matches, with authoritative spelling.
    pub found: Vec<CardRecord>,
    /// Input names the endpoint could not match.
    pub not_found: Vec<String>,
}

#[derive(Serialize)]
struct Identifier<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct NamedIdentifier {
    name: String,
}

#[derive(Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    data: Vec<CardRecord>,
    #[serde(default)]
    not_found: Vec<NamedIdentifier>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<CardRecord>,
}

// ---------------------------------------------------------------------------
// CardLookup
// ---------------------------------------------------------------------------

/// External card database access, as the resolver consumes it.
pub trait CardLookup: Send + Sync {
    /// Exact bulk lookup of up to [`config::BULK_BATCH_SIZE`] names.
    fn lookup_collection(&self, names: &[String]) -> Result<CollectionPage>;

    /// Fuzzy relevance search; only the top-ranked match matters.
    fn search_top(&self, query: &str) -> Result<Option<CardRecord>>;
}

// ---------------------------------------------------------------------------
// ScryfallClient
// ---------------------------------------------------------------------------

/// HTTP-backed [`CardLookup`] against the Scryfall API.
///
/// Uses two clients: bulk lookups tolerate a longer timeout, while the rescue
/// search costs one round trip per missing card and must fail fast.
pub struct ScryfallClient {
    bulk: Client,
    search: Client,
    collection_url: String,
    search_url: String,
}

impl ScryfallClient {
    pub fn new() -> Result<Self> {
        let bulk = Client::builder().timeout(config::COLLECTION_TIMEOUT).build()?;
        let search = Client::builder().timeout(config::SEARCH_TIMEOUT).build()?;
        Ok(Self {
            bulk,
            search,
            collection_url: config::SCRYFALL_COLLECTION_URL.to_string(),
            search_url: config::SCRYFALL_SEARCH_URL.to_string(),
        })
    }

    /// Point the client at alternative endpoints (local proxies, mirrors).
    pub fn with_urls(mut self, collection_url: impl Into<String>, search_url: impl Into<String>) -> Self {
        self.collection_url = collection_url.into();
        self.search_url = search_url.into();
        self
    }
}

impl CardLookup for ScryfallClient {
    fn lookup_collection(&self, names: &[String]) -> Result<CollectionPage> {
        let identifiers: Vec<Identifier<'_>> =
            names.iter().map(|n| Identifier { name: n }).collect();

        let resp = self
            .bulk
            .post(&self.collection_url)
            .json(&serde_json::json!({ "identifiers": identifiers }))
            .send()?
            .error_for_status()?;

        let body: CollectionResponse = resp.json()?;
        Ok(CollectionPage {
            found: body.data,
            not_found: body.not_found.into_iter().map(|i| i.name).collect(),
        })
    }

    fn search_top(&self, query: &str) -> Result<Option<CardRecord>> {
        let resp = self
            .search
            .get(&self.search_url)
            .query(&[("q", format!("\"{}\"", query))])
            .send()?;

        if !resp.status().is_success() {
            // 404 means "no matches" on this endpoint, not a fault.
            return Ok(None);
        }

        let body: SearchResponse = resp.json()?;
        Ok(body.data.into_iter().next())
    }
}

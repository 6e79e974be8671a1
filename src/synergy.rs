//! EDHREC synergy recommendations for a commander.
//!
//! Cache-first with no TTL: within one process lifetime, stale-but-available
//! beats a refetch. Every failure path degrades to `None` so a synergy outage
//! never blocks a turn.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Slug derivation
// ---------------------------------------------------------------------------

/// Derive the URL-safe EDHREC slug for a commander name.
///
/// Rules, in order: lower-case; strip apostrophes and commas; collapse the
/// split-card `" // "` separator into a dash; drop remaining
/// non-alphanumerics; collapse whitespace runs to single dashes.
///
/// `Atraxa, Praetors' Voice` -> `atraxa-praetors-voice`.
pub fn commander_slug(name: &str) -> String {
    let lowered = name
        .to_lowercase()
        .replace('\'', "")
        .replace(',', "")
        .replace(" // ", "-");

    let mut cleaned = String::with_capacity(lowered.len());
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch.is_whitespace() {
            cleaned.push(ch);
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

// ---------------------------------------------------------------------------
// SynergyFetch
// ---------------------------------------------------------------------------

/// Fetches the raw synergy document for a commander slug.
///
/// `Ok(None)` means "no page for this commander" (non-200, unknown slug);
/// `Err` means transport trouble. The advisor treats both as no data.
pub trait SynergyFetch: Send + Sync {
    fn fetch_page(&self, slug: &str) -> Result<Option<Value>>;
}

/// HTTP fetcher against the EDHREC JSON pages.
pub struct EdhrecClient {
    http: Client,
    base: String,
}

impl EdhrecClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder().timeout(config::SYNERGY_TIMEOUT).build()?;
        Ok(Self {
            http,
            base: config::EDHREC_COMMANDER_BASE.to_string(),
        })
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }
}

impl SynergyFetch for EdhrecClient {
    fn fetch_page(&self, slug: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}.json", self.base, slug);
        let resp = self.http.get(&url).send()?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        Ok(Some(resp.json()?))
    }
}

// ---------------------------------------------------------------------------
// SynergyAdvisor
// ---------------------------------------------------------------------------

/// Cached synergy recommendations keyed by commander name.
pub struct SynergyAdvisor {
    fetcher: Box<dyn SynergyFetch>,
    cache: Mutex<HashMap<String, Vec<String>>>,
}

impl SynergyAdvisor {
    pub fn new(fetcher: Box<dyn SynergyFetch>) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Up to 40 recommended card names for a commander, or `None` when no
    /// synergy data is available. Cached entries are returned unchanged with
    /// no refetch.
    pub fn recommendations(&self, commander: &str) -> Option<Vec<String>> {
        if let Some(hit) = self.cache.lock().ok()?.get(commander) {
            return Some(hit.clone());
        }

        let slug = commander_slug(commander);
        let page = match self.fetcher.fetch_page(&slug) {
            Ok(Some(page)) => page,
            Ok(None) => return None,
            Err(e) => {
                eprintln!("Synergy fetch failed for '{commander}': {e}");
                return None;
            }
        };

        let recommendations = extract_recommendations(&page)?;
        self.cache
            .lock()
            .ok()?
            .insert(commander.to_string(), recommendations.clone());
        Some(recommendations)
    }
}

/// Mine the allow-listed sections of a synergy page for card names:
/// up to 15 per section, deduplicated case-insensitively, capped at 40.
///
/// Returns `None` when the page lacks the expected card-list structure.
fn extract_recommendations(page: &Value) -> Option<Vec<String>> {
    let cardlists = page
        .get("container")?
        .get("json_dict")?
        .get("cardlists")?
        .as_array()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    for section in cardlists {
        let header = section.get("header").and_then(Value::as_str).unwrap_or("");
        if !config::SYNERGY_SECTIONS.contains(&header) {
            continue;
        }
        let Some(views) = section.get("cardviews").and_then(Value::as_array) else {
            continue;
        };
        for card in views.iter().take(config::SYNERGY_SECTION_LIMIT) {
            if let Some(name) = card.get("name").and_then(Value::as_str) {
                if seen.insert(name.to_lowercase()) {
                    out.push(name.to_string());
                    if out.len() == config::SYNERGY_CAP {
                        return Some(out);
                    }
                }
            }
        }
    }

    Some(out)
}

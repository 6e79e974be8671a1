//! Card name resolution: untrusted model-emitted names to canonical
//! spellings plus color-identity metadata.
//!
//! Two layers, in order:
//! 1. Exact bulk lookup in batches of 75. A whole-batch transport or parse
//!    failure sends every name in the batch to rescue rather than silently
//!    dropping it.
//! 2. Per-name fuzzy-search rescue for everything the bulk pass missed.
//!    The top-ranked hit is accepted as authoritative.
//!
//! Names that survive both layers unmatched land in `unresolved`. Deletion
//! policy belongs to the caller; this module never discards a name.

use std::collections::HashMap;

use crate::config;
use crate::scryfall::CardLookup;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Index built by one validation pass. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Lower-cased input name -> canonical name.
    pub resolved: HashMap<String, String>,
    /// Canonical name -> color identity (subset of W/U/B/R/G).
    pub colors: HashMap<String, Vec<String>>,
    /// Inputs that neither lookup layer could match. Kept verbatim.
    pub unresolved: Vec<String>,
}

impl Resolution {
    /// Canonical spelling for an input name, if it resolved.
    pub fn canonical(&self, name: &str) -> Option<&str> {
        self.resolved.get(&name.to_lowercase()).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

/// Resolve a set of card names against the card database.
///
/// Input names should already be deduplicated case-insensitively (see
/// [`Deck::unique_names`](crate::models::Deck::unique_names)); repeated
/// casings collapse onto one lower-cased key regardless.
///
/// An empty input returns empty structures without touching the network.
pub fn resolve(lookup: &dyn CardLookup, names: &[String]) -> Resolution {
    let mut resolution = Resolution::default();
    if names.is_empty() {
        return resolution;
    }

    let mut rescue: Vec<String> = Vec::new();

    for batch in names.chunks(config::BULK_BATCH_SIZE) {
        match lookup.lookup_collection(batch) {
            Ok(page) => {
                for card in page.found {
                    resolution
                        .resolved
                        .insert(card.name.to_lowercase(), card.name.clone());
                    resolution.colors.insert(card.name, card.color_identity);
                }
                rescue.extend(page.not_found);
            }
            Err(e) => {
                // Fail open toward rescue: every name in the batch gets an
                // individual second chance.
                eprintln!("Bulk card lookup failed ({e}); rescuing batch individually");
                rescue.extend(batch.iter().cloned());
            }
        }
    }

    for name in rescue {
        if resolution.resolved.contains_key(&name.to_lowercase()) {
            continue;
        }

        // Apostrophes are the most common LLM misspelling artifact.
        let query = name.replace('\'', "");
        match lookup.search_top(&query) {
            Ok(Some(card)) => {
                resolution
                    .resolved
                    .insert(name.to_lowercase(), card.name.clone());
                resolution.colors.insert(card.name, card.color_identity);
            }
            Ok(None) => resolution.unresolved.push(name),
            Err(e) => {
                eprintln!("Card search rescue failed for '{name}': {e}");
                resolution.unresolved.push(name);
            }
        }
    }

    resolution
}

//! Shared test stubs: a scripted generator, an in-memory card table, and a
//! canned synergy fetcher, each with call counters so tests can assert how
//! much network traffic a code path would have produced.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use deckwright::error::{AssistantError, Result};
use deckwright::generate::Generate;
use deckwright::models::ChatMessage;
use deckwright::scryfall::{CardLookup, CardRecord, CollectionPage};
use deckwright::synergy::SynergyFetch;

// ---------------------------------------------------------------------------
// CallCounter
// ---------------------------------------------------------------------------

/// Cloneable counter handle; clones share the same count, so a test can keep
/// one while the stub moves into the assistant.
#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// Generation stub that replays canned replies in order and records every
/// outbound message list.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
    pub calls: CallCounter,
    pub sent: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: CallCounter::default(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Generate for ScriptedGenerator {
    fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.bump();
        self.sent.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AssistantError::Generation("scripted replies exhausted".to_string()))
    }

    fn model(&self) -> &str {
        "scripted-test-model"
    }
}

// ---------------------------------------------------------------------------
// StubLookup
// ---------------------------------------------------------------------------

/// In-memory card table. Bulk lookups match names case-insensitively;
/// rescue searches additionally ignore apostrophes, like the real relevance
/// search effectively does for these inputs.
pub struct StubLookup {
    cards: Vec<CardRecord>,
    resolve_all: bool,
    fail_collection: bool,
    pub collection_calls: CallCounter,
    pub search_calls: CallCounter,
}

impl StubLookup {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self {
            cards,
            resolve_all: false,
            fail_collection: false,
            collection_calls: CallCounter::default(),
            search_calls: CallCounter::default(),
        }
    }

    /// Echo every requested name back as an exact match with no colors.
    pub fn resolve_all() -> Self {
        let mut stub = Self::new(Vec::new());
        stub.resolve_all = true;
        stub
    }

    /// Bulk endpoint down; only the search pathway works.
    pub fn failing(cards: Vec<CardRecord>) -> Self {
        let mut stub = Self::new(cards);
        stub.fail_collection = true;
        stub
    }
}

impl CardLookup for StubLookup {
    fn lookup_collection(&self, names: &[String]) -> Result<CollectionPage> {
        self.collection_calls.bump();
        if self.fail_collection {
            return Err(AssistantError::Generation(
                "collection endpoint down".to_string(),
            ));
        }

        let mut page = CollectionPage::default();
        for name in names {
            if self.resolve_all {
                page.found.push(CardRecord {
                    name: name.clone(),
                    color_identity: Vec::new(),
                });
                continue;
            }
            match self
                .cards
                .iter()
                .find(|c| c.name.to_lowercase() == name.to_lowercase())
            {
                Some(card) => page.found.push(card.clone()),
                None => page.not_found.push(name.clone()),
            }
        }
        Ok(page)
    }

    fn search_top(&self, query: &str) -> Result<Option<CardRecord>> {
        self.search_calls.bump();
        let q = query.to_lowercase();
        Ok(self
            .cards
            .iter()
            .find(|c| {
                let name = c.name.to_lowercase();
                name == q || name.replace('\'', "") == q
            })
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// StubSynergy
// ---------------------------------------------------------------------------

/// Synergy fetcher returning one canned page (or nothing).
pub struct StubSynergy {
    page: Option<Value>,
    pub calls: CallCounter,
}

impl StubSynergy {
    pub fn none() -> Self {
        Self {
            page: None,
            calls: CallCounter::default(),
        }
    }

    pub fn with_page(page: Value) -> Self {
        Self {
            page: Some(page),
            calls: CallCounter::default(),
        }
    }
}

impl SynergyFetch for StubSynergy {
    fn fetch_page(&self, _slug: &str) -> Result<Option<Value>> {
        self.calls.bump();
        Ok(self.page.clone())
    }
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

pub fn card(name: &str, colors: &[&str]) -> CardRecord {
    CardRecord {
        name: name.to_string(),
        color_identity: colors.iter().map(|c| c.to_string()).collect(),
    }
}

/// An EDHREC-shaped page with the given `(header, card names)` sections.
pub fn synergy_page(sections: &[(&str, Vec<String>)]) -> Value {
    let cardlists: Vec<Value> = sections
        .iter()
        .map(|(header, names)| {
            json!({
                "header": header,
                "cardviews": names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({ "container": { "json_dict": { "cardlists": cardlists } } })
}

/// A deck JSON value sized `1 + creatures + lands`.
pub fn deck_json(commander: &str, creatures: usize, lands: usize) -> Value {
    json!({
        "Commander": [commander],
        "Creatures": (0..creatures).map(|i| format!("Test Creature {i}")).collect::<Vec<_>>(),
        "Lands": vec!["Forest".to_string(); lands],
    })
}

/// A full model reply wrapping the given deck.
pub fn reply_json(message: &str, deck: Value) -> String {
    json!({
        "Type": "Deck",
        "Message": message,
        "RequestedPrice": 0.0,
        "Theme": "Test",
        "Deck": deck,
    })
    .to_string()
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Deck — the 100-card Commander deck list, grouped by category
// ---------------------------------------------------------------------------

/// A Commander deck as exchanged with the model: nine fixed categories, each
/// an ordered list of card-name strings. Names are free-form until they pass
/// through the resolver; card identity is case-insensitive.
///
/// Every field defaults to empty so a partial model response still
/// deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Holds exactly 0 or 1 entries.
    #[serde(rename = "Commander", default)]
    pub commander: Vec<String>,
    #[serde(rename = "Creatures", default)]
    pub creatures: Vec<String>,
    #[serde(rename = "Artifacts", default)]
    pub artifacts: Vec<String>,
    #[serde(rename = "Enchantments", default)]
    pub enchantments: Vec<String>,
    #[serde(rename = "Instants", default)]
    pub instants: Vec<String>,
    #[serde(rename = "Sorceries", default)]
    pub sorceries: Vec<String>,
    #[serde(rename = "Planeswalkers", default)]
    pub planeswalkers: Vec<String>,
    #[serde(rename = "NonBasicLands", default)]
    pub non_basic_lands: Vec<String>,
    #[serde(rename = "Lands", default)]
    pub lands: Vec<String>,
}

impl Deck {
    fn lists(&self) -> [&Vec<String>; 9] {
        [
            &self.commander,
            &self.creatures,
            &self.artifacts,
            &self.enchantments,
            &self.instants,
            &self.sorceries,
            &self.planeswalkers,
            &self.non_basic_lands,
            &self.lands,
        ]
    }

    fn lists_mut(&mut self) -> [&mut Vec<String>; 9] {
        [
            &mut self.commander,
            &mut self.creatures,
            &mut self.artifacts,
            &mut self.enchantments,
            &mut self.instants,
            &mut self.sorceries,
            &mut self.planeswalkers,
            &mut self.non_basic_lands,
            &mut self.lands,
        ]
    }

    /// Total card count across all categories.
    pub fn card_count(&self) -> usize {
        self.lists().iter().map(|l| l.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.card_count() == 0
    }

    /// The designated commander, if one is present.
    pub fn commander(&self) -> Option<&str> {
        self.commander.first().map(String::as_str)
    }

    /// All distinct card names, deduplicated case-insensitively. The
    /// first-seen casing is kept so lookups see what the model actually wrote.
    pub fn unique_names(&self) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();
        for list in self.lists() {
            for name in list {
                if seen.insert(name.to_lowercase()) {
                    out.push(name.clone());
                }
            }
        }
        out
    }

    /// Rewrite every card name through a resolved `lowercase input ->
    /// canonical name` mapping. Names with no mapping pass through unchanged;
    /// nothing is ever dropped here.
    pub fn rewrite_names(&mut self, resolved: &HashMap<String, String>) {
        for list in self.lists_mut() {
            for name in list.iter_mut() {
                if let Some(canonical) = resolved.get(&name.to_lowercase()) {
                    if canonical != name {
                        *name = canonical.clone();
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// DeckMeta — sticky metadata alongside the deck
// ---------------------------------------------------------------------------

/// Deck metadata carried across turns. Fields update only when a model
/// response supplies them; otherwise the previous values stick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckMeta {
    #[serde(rename = "RequestedPrice")]
    pub requested_price: f64,
    /// Client-reported total, advisory only. Never validated server-side.
    #[serde(rename = "CurrentDeckPrice")]
    pub current_deck_price: f64,
    #[serde(rename = "Theme")]
    pub theme: String,
}

impl Default for DeckMeta {
    fn default() -> Self {
        Self {
            requested_price: 0.0,
            current_deck_price: 0.0,
            theme: "None".to_string(),
        }
    }
}

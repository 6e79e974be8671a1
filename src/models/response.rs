use serde::{Deserialize, Serialize};

use crate::models::Deck;

// ---------------------------------------------------------------------------
// DeckResponse — the model's reply shape
// ---------------------------------------------------------------------------

/// The JSON object a generation backend is instructed to return. Every field
/// is optional: models drop fields under pressure, and downstream code
/// pattern-matches instead of assuming presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeckResponse {
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "RequestedPrice", default)]
    pub requested_price: Option<f64>,
    #[serde(rename = "Theme", default)]
    pub theme: Option<String>,
    #[serde(rename = "Deck", default)]
    pub deck: Option<Deck>,
}

// ---------------------------------------------------------------------------
// ParsedReply — tagged parse outcome
// ---------------------------------------------------------------------------

/// Outcome of parsing raw generation output. Malformed output is not an
/// error: it degrades the turn to conversation-only, carrying the raw text as
/// the reply message.
#[derive(Debug, Clone)]
pub enum ParsedReply {
    Ok(DeckResponse),
    Malformed(String),
}

impl ParsedReply {
    /// Parse raw model output. Strips markdown code fences, then tries the
    /// whole text as JSON, then salvages the outermost `{...}` span before
    /// giving up.
    pub fn parse(raw: &str) -> ParsedReply {
        let cleaned = strip_code_fences(raw);

        if let Ok(resp) = serde_json::from_str::<DeckResponse>(&cleaned) {
            return ParsedReply::Ok(resp);
        }

        // Grounded models like to wrap JSON in prose; salvage the outermost
        // object span.
        if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
            if start < end {
                if let Ok(resp) = serde_json::from_str::<DeckResponse>(&cleaned[start..=end]) {
                    return ParsedReply::Ok(resp);
                }
            }
        }

        ParsedReply::Malformed(cleaned)
    }
}

/// Remove markdown code-fence wrapping from model output.
///
/// Models fence JSON despite instructions not to. A leading ```` ```json ````
/// or bare ```` ``` ```` fence is removed along with any remaining fence
/// markers; unfenced text passes through trimmed.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.replace("```", "").trim().to_string()
    } else if trimmed.starts_with("```") {
        trimmed.replace("```", "").trim().to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// TurnReply — the outward-facing turn result
// ---------------------------------------------------------------------------

/// What one completed turn hands back to the caller: the message, the
/// current deck, and its metadata, all in the original wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "RequestedPrice")]
    pub requested_price: f64,
    #[serde(rename = "Theme")]
    pub theme: String,
    #[serde(rename = "Deck")]
    pub deck: Deck,
    #[serde(rename = "CardCount")]
    pub card_count: usize,
}

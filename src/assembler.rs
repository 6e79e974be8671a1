//! The turn pipeline: prompt assembly, generation, validation, and the
//! convergence loop that drives a deck toward exactly 100 cards.
//!
//! One turn: guardrails -> outbound message assembly -> generation -> parse
//! -> resolve/rewrite/legality-check -> at most one refinement round ->
//! commit. Any pipeline fault is caught at the turn boundary and answered
//! with the last known-good deck; session history updates only after the
//! whole turn succeeds.

use std::time::Instant;

use serde::Deserialize;

use crate::config;
use crate::error::Result;
use crate::generate::Generate;
use crate::legality;
use crate::models::{ChatMessage, Deck, DeckResponse, ParsedReply, TurnReply};
use crate::resolver;
use crate::scryfall::CardLookup;
use crate::session::Session;
use crate::synergy::SynergyAdvisor;
use crate::telemetry::{TelemetryLog, PATHWAY_SAFETY_VIOLATION};

// ---------------------------------------------------------------------------
// TurnRequest / ValidationPolicy
// ---------------------------------------------------------------------------

/// One inbound user turn.
#[derive(Debug, Clone, Deserialize)]
pub struct TurnRequest {
    pub message: String,
    /// Client-reported deck price, advisory only.
    #[serde(rename = "deckPrice", default)]
    pub deck_price: f64,
}

/// How rigorously model output is validated before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// For ungrounded local models: full Scryfall resolution plus
    /// color-identity check; refine once when the deck is substantial but
    /// short (strictly between 50 and 100 cards).
    Full,
    /// For search-grounded models that verify cards themselves: skip
    /// resolution, but still refine whenever the count is not exactly 100.
    TrustGrounded,
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Borrowing wrapper that runs one turn against a session. Constructed
/// per-call by [`DeckAssistant::turn`](crate::DeckAssistant::turn).
pub(crate) struct Assembler<'a> {
    pub generator: &'a dyn Generate,
    pub lookup: &'a dyn CardLookup,
    pub synergy: &'a SynergyAdvisor,
    pub telemetry: Option<&'a TelemetryLog>,
    pub policy: ValidationPolicy,
}

impl Assembler<'_> {
    pub fn run(&self, session: &mut Session, request: &TurnRequest) -> TurnReply {
        // Guardrails short-circuit before any model call and before any
        // state mutation; the caller still gets the existing deck back.
        if request.message.len() > config::MAX_INPUT_LENGTH {
            return self.echo(
                session,
                format!(
                    "Error: Message too long. Limit is {} characters.",
                    config::MAX_INPUT_LENGTH
                ),
            );
        }

        let lower_input = request.message.to_lowercase();
        if config::FORBIDDEN_PHRASES
            .iter()
            .any(|phrase| lower_input.contains(phrase))
        {
            if let Some(telemetry) = self.telemetry {
                telemetry.record(PATHWAY_SAFETY_VIOLATION, std::time::Duration::ZERO);
            }
            return self.echo(session, config::REFUSAL_MESSAGE.to_string());
        }

        if request.message.trim().is_empty() {
            return self.echo(session, "Error: No input provided.".to_string());
        }

        match self.pipeline(session, request) {
            Ok(reply) => reply,
            Err(e) => {
                eprintln!("Turn failed: {e}");
                self.echo(session, format!("Error: {e}"))
            }
        }
    }

    /// Steps 2-8 of a turn. Errors here are caught in [`run`] and answered
    /// with the last known-good deck.
    fn pipeline(&self, session: &mut Session, request: &TurnRequest) -> Result<TurnReply> {
        session.meta.current_deck_price = request.deck_price;

        let augmented = match self.policy {
            ValidationPolicy::Full => {
                format!("{} Send back a 100 Card Deck!", request.message)
            }
            ValidationPolicy::TrustGrounded => format!(
                "{} Search for valid cards and prices. Send back a 100 Card Deck JSON!",
                request.message
            ),
        };
        let user_turn = ChatMessage::user(augmented);
        let outbound = self.assemble_messages(session, user_turn.clone());

        let raw = self.generate_timed(&outbound)?;

        let mut response = match ParsedReply::parse(&raw) {
            ParsedReply::Ok(response) => response,
            ParsedReply::Malformed(text) => {
                // Not fatal: the turn degrades to conversation-only, with
                // the raw text as the reply and the deck unchanged.
                eprintln!("Generation output was not valid JSON; passing text through");
                DeckResponse {
                    kind: Some("Deck".to_string()),
                    message: Some(text),
                    ..Default::default()
                }
            }
        };

        let mut warnings: Vec<String> = Vec::new();

        let final_deck = match response.deck.take() {
            Some(deck) if !deck.is_empty() => {
                let theme = session.meta.theme.clone();
                self.converge(&outbound, &raw, deck, &theme, &mut response, &mut warnings)
            }
            _ => session.deck.clone(),
        };

        // Sticky metadata: only fields the response carries are updated.
        if let Some(price) = response.requested_price {
            session.meta.requested_price = price;
        }
        if let Some(theme) = response.theme.as_ref() {
            session.meta.theme = theme.clone();
        }

        let mut message = response.message.clone().unwrap_or_default();
        if !warnings.is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(&warnings.join("\n"));
        }

        // Commit point: deck first, then history, only now that the whole
        // round has succeeded.
        session.deck = final_deck.clone();
        let compact =
            serde_json::json!({ "Type": "Deck", "Message": message }).to_string();
        session.record_exchange(user_turn, ChatMessage::assistant(compact));

        let card_count = final_deck.card_count();
        Ok(TurnReply {
            kind: "Deck".to_string(),
            message,
            requested_price: session.meta.requested_price,
            theme: session.meta.theme.clone(),
            deck: final_deck,
            card_count,
        })
    }

    /// Build the outbound message list: system prompt, deck-state context
    /// (when a deck exists), synergy hint, a bounded window of recent turns,
    /// then the current user turn.
    fn assemble_messages(&self, session: &Session, user_turn: ChatMessage) -> Vec<ChatMessage> {
        let mut outbound = vec![session.system_turn().clone()];

        if !session.deck.is_empty() {
            let context = serde_json::json!({
                "Deck": session.deck,
                "RequestedPrice": session.meta.requested_price,
                "CurrentDeckPrice": session.meta.current_deck_price,
                "Theme": session.meta.theme,
                "CardCount": session.deck.card_count(),
            });
            outbound.push(ChatMessage::system(format!(
                "CURRENT DECK JSON STATE: {context}"
            )));
        }

        // Grounded models browse EDHREC themselves; only ungrounded runs
        // get the hint injected.
        if self.policy == ValidationPolicy::Full {
            if let Some(commander) = session.deck.commander() {
                if let Some(cards) = self.synergy.recommendations(commander) {
                    if !cards.is_empty() {
                        outbound.push(ChatMessage::system(format!(
                            "EDHREC DATA for {commander}:\nTop Synergy Cards: {}.\nPrioritize these cards.",
                            cards.join(", ")
                        )));
                    }
                }
            }
        }

        outbound.extend_from_slice(session.recent_turns(config::HISTORY_WINDOW));
        outbound.push(user_turn);
        outbound
    }

    /// Validate a freshly generated deck and, if it is the wrong size under
    /// the active policy, run exactly one refinement round. A refinement
    /// that fails to parse (or fails in transit) keeps the first-round deck.
    fn converge(
        &self,
        outbound: &[ChatMessage],
        raw: &str,
        mut deck: Deck,
        theme: &str,
        response: &mut DeckResponse,
        warnings: &mut Vec<String>,
    ) -> Deck {
        match self.policy {
            ValidationPolicy::Full => {
                self.validate(&mut deck, warnings);

                let count = deck.card_count();
                if count > config::REFINE_FLOOR && count < config::DECK_TARGET {
                    eprintln!(
                        "Deck incomplete ({count}/{}). Triggering auto-refinement.",
                        config::DECK_TARGET
                    );
                    let needed = config::DECK_TARGET - count;
                    let directive = format!(
                        "The deck currently has {count} cards. \
                         You MUST add exactly {needed} more cards to reach {target}. \
                         Fill the rest with Basic Lands if you run out of ideas. \
                         Output the COMPLETE updated {target}-card deck JSON.",
                        target = config::DECK_TARGET
                    );

                    if let Some(mut refined) =
                        self.refine_round(outbound, raw, ChatMessage::system(directive))
                    {
                        if let Some(mut refined_deck) = refined.deck.take() {
                            if !refined_deck.is_empty() {
                                self.validate(&mut refined_deck, warnings);
                                let new_count = refined_deck.card_count();
                                warnings.push(format!(
                                    "[AUTO-REFINE]: I noticed the deck was short ({count} cards), \
                                     so I added {} more cards to reach the target.",
                                    new_count.saturating_sub(count)
                                ));
                                *response = refined;
                                deck = refined_deck;
                            }
                        }
                    }
                }
            }
            ValidationPolicy::TrustGrounded => {
                let count = deck.card_count();
                if count != config::DECK_TARGET {
                    eprintln!("Deck count {count}/{}. Refining.", config::DECK_TARGET);
                    let needed = config::DECK_TARGET as i64 - count as i64;
                    let directive = format!(
                        "The deck currently has {count} valid cards. \
                         You MUST add exactly {needed} more cards to reach {target}. \
                         Stick to the theme: {theme}. \
                         Fill empty slots with Basic Lands if needed. \
                         Output the COMPLETE {target}-card deck JSON.",
                        target = config::DECK_TARGET
                    );

                    if let Some(mut refined) =
                        self.refine_round(outbound, raw, ChatMessage::user(directive))
                    {
                        if let Some(refined_deck) = refined.deck.take() {
                            if !refined_deck.is_empty() {
                                warnings.push(format!(
                                    "[REFINED]: Deck updated to {} cards.",
                                    refined_deck.card_count()
                                ));
                                *response = refined;
                                deck = refined_deck;
                            }
                        }
                    }
                }
            }
        }

        deck
    }

    /// Run the single refinement call: prior exchange plus the directive.
    /// Returns `None` on transport failure or unparsable output — the caller
    /// keeps the first-round result either way.
    fn refine_round(
        &self,
        outbound: &[ChatMessage],
        raw: &str,
        directive: ChatMessage,
    ) -> Option<DeckResponse> {
        let mut refine_messages = outbound.to_vec();
        refine_messages.push(ChatMessage::assistant(raw));
        refine_messages.push(directive);

        let refined_raw = match self.generate_timed(&refine_messages) {
            Ok(refined_raw) => refined_raw,
            Err(e) => {
                eprintln!("Refinement call failed ({e}); keeping first-round deck");
                return None;
            }
        };

        match ParsedReply::parse(&refined_raw) {
            ParsedReply::Ok(refined) => Some(refined),
            ParsedReply::Malformed(_) => {
                eprintln!("Failed to parse refined deck response; keeping first-round deck");
                None
            }
        }
    }

    /// Resolve every name in the deck, rewrite to canonical spellings
    /// (unresolved names pass through), and flag color-identity violations.
    fn validate(&self, deck: &mut Deck, warnings: &mut Vec<String>) {
        let names = deck.unique_names();
        let resolution = resolver::resolve(self.lookup, &names);
        deck.rewrite_names(&resolution.resolved);

        // After the rewrite the commander entry is already canonical when it
        // resolved at all.
        let illegal = legality::illegal_cards(&resolution, deck.commander());

        if !resolution.unresolved.is_empty() {
            warnings.push(format!(
                "[SYSTEM WARNING]: Missing/Misspelled cards kept: {}...",
                sample(&resolution.unresolved)
            ));
        }
        if !illegal.is_empty() {
            warnings.push(format!(
                "[COLOR IDENTITY WARNING]: These cards are not legal in this \
                 commander's color identity: {}...",
                sample(&illegal)
            ));
        }
    }

    fn generate_timed(&self, messages: &[ChatMessage]) -> Result<String> {
        let start = Instant::now();
        let result = self.generator.generate(messages);
        if result.is_ok() {
            if let Some(telemetry) = self.telemetry {
                telemetry.record(self.generator.telemetry_pathway(), start.elapsed());
            }
        }
        result
    }

    /// Reply with a message and the unchanged session state.
    fn echo(&self, session: &Session, message: String) -> TurnReply {
        TurnReply {
            kind: "Deck".to_string(),
            message,
            requested_price: session.meta.requested_price,
            theme: session.meta.theme.clone(),
            deck: session.deck.clone(),
            card_count: session.deck.card_count(),
        }
    }
}

/// First few names of a warning list, comma-joined.
fn sample(names: &[String]) -> String {
    names
        .iter()
        .take(config::WARNING_SAMPLE)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

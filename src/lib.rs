//! Conversational Commander deck-building assistant.
//!
//! Turns natural-language chat into a validated 100-card Commander deck
//! list: model output is parsed as JSON, card names are resolved against
//! Scryfall (bulk exact lookup with a fuzzy-search rescue), color-identity
//! legality is checked against the commander, and under-sized decks get one
//! automatic refinement round. EDHREC synergy data enriches the prompt.
//!
//! # Quick start
//!
//! ```no_run
//! use deckwright::{DeckAssistant, TurnRequest};
//!
//! let assistant = DeckAssistant::builder().build().unwrap();
//! let mut session = assistant.new_session();
//!
//! let reply = assistant.turn(
//!     &mut session,
//!     &TurnRequest {
//!         message: "Build me an Atraxa counters deck".to_string(),
//!         deck_price: 0.0,
//!     },
//! );
//! println!("{} ({} cards)", reply.message, reply.card_count);
//! ```

pub mod assembler;
#[cfg(feature = "async")]
pub mod async_client;
pub mod config;
pub mod error;
pub mod generate;
pub mod legality;
pub mod models;
pub mod resolver;
pub mod scryfall;
pub mod session;
pub mod synergy;
pub mod telemetry;

pub use assembler::{TurnRequest, ValidationPolicy};
#[cfg(feature = "async")]
pub use async_client::AsyncDeckAssistant;
pub use error::{AssistantError, Result};
pub use models::{ChatMessage, Deck, DeckMeta, DeckResponse, Role, TurnReply};
pub use session::{Session, SessionStore};

use std::fmt;
use std::path::PathBuf;

use crate::generate::{Generate, OllamaGenerator};
use crate::scryfall::{CardLookup, ScryfallClient};
use crate::synergy::{EdhrecClient, SynergyAdvisor, SynergyFetch};
use crate::telemetry::TelemetryLog;

// ---------------------------------------------------------------------------
// DeckAssistantBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DeckAssistant`].
///
/// Every collaborator has a production default: a local Ollama generator,
/// the Scryfall HTTP client, and the EDHREC fetcher. Tests substitute stubs
/// through the same setters.
#[derive(Default)]
pub struct DeckAssistantBuilder {
    generator: Option<Box<dyn Generate>>,
    lookup: Option<Box<dyn CardLookup>>,
    synergy_fetch: Option<Box<dyn SynergyFetch>>,
    policy: Option<ValidationPolicy>,
    telemetry_path: Option<PathBuf>,
    system_prompt: Option<String>,
}

impl DeckAssistantBuilder {
    /// Set the generation backend. Defaults to an Ollama client against
    /// `localhost` with the stock local model.
    pub fn generator(mut self, generator: Box<dyn Generate>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the card database client. Defaults to [`ScryfallClient`].
    pub fn card_lookup(mut self, lookup: Box<dyn CardLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Set the synergy page fetcher. Defaults to [`EdhrecClient`].
    pub fn synergy_fetch(mut self, fetch: Box<dyn SynergyFetch>) -> Self {
        self.synergy_fetch = Some(fetch);
        self
    }

    /// Set the validation policy. Defaults to [`ValidationPolicy::Full`].
    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Enable the JSONL telemetry side log at the given path.
    pub fn telemetry_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.telemetry_path = Some(path.into());
        self
    }

    /// Override the instruction prompt. Defaults to the policy-appropriate
    /// built-in prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Build the assistant, constructing any collaborators left at their
    /// defaults.
    pub fn build(self) -> Result<DeckAssistant> {
        let policy = self.policy.unwrap_or(ValidationPolicy::Full);

        let generator = match self.generator {
            Some(generator) => generator,
            None => Box::new(OllamaGenerator::new(
                config::OLLAMA_DEFAULT_HOST,
                config::DEFAULT_LOCAL_MODEL,
            )?),
        };
        let lookup = match self.lookup {
            Some(lookup) => lookup,
            None => Box::new(ScryfallClient::new()?),
        };
        let synergy_fetch = match self.synergy_fetch {
            Some(fetch) => fetch,
            None => Box::new(EdhrecClient::new()?),
        };

        let system_prompt = self.system_prompt.unwrap_or_else(|| match policy {
            ValidationPolicy::Full => config::SYSTEM_PROMPT.to_string(),
            ValidationPolicy::TrustGrounded => config::GROUNDED_SYSTEM_PROMPT.to_string(),
        });

        let telemetry = self
            .telemetry_path
            .map(|path| TelemetryLog::new(path, generator.model().to_string()));

        Ok(DeckAssistant {
            generator,
            lookup,
            synergy: SynergyAdvisor::new(synergy_fetch),
            telemetry,
            policy,
            system_prompt,
        })
    }
}

// ---------------------------------------------------------------------------
// DeckAssistant
// ---------------------------------------------------------------------------

/// The main entry point: owns the generation backend, the card database
/// client, the synergy advisor, and the validation policy, and runs turns
/// against caller-held [`Session`] state.
///
/// The assistant itself is immutable per turn (`&self`); all conversation
/// state lives in the session, so one assistant serves any number of
/// concurrent conversations.
pub struct DeckAssistant {
    generator: Box<dyn Generate>,
    lookup: Box<dyn CardLookup>,
    synergy: SynergyAdvisor,
    telemetry: Option<TelemetryLog>,
    policy: ValidationPolicy,
    system_prompt: String,
}

impl DeckAssistant {
    /// Create a new builder for configuring the assistant.
    pub fn builder() -> DeckAssistantBuilder {
        DeckAssistantBuilder::default()
    }

    /// Run one turn against a session.
    ///
    /// Never returns an error: guardrail rejections, malformed model output,
    /// and pipeline faults all degrade to a reply carrying the last
    /// known-good deck.
    pub fn turn(&self, session: &mut Session, request: &TurnRequest) -> TurnReply {
        let assembler = assembler::Assembler {
            generator: self.generator.as_ref(),
            lookup: self.lookup.as_ref(),
            synergy: &self.synergy,
            telemetry: self.telemetry.as_ref(),
            policy: self.policy,
        };
        assembler.run(session, request)
    }

    /// A fresh session opened with this assistant's instruction prompt.
    pub fn new_session(&self) -> Session {
        Session::new(self.system_prompt.clone())
    }

    /// A session store that creates sessions with this assistant's
    /// instruction prompt, keyed by conversation id.
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.system_prompt.clone())
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Model identifier of the configured generation backend.
    pub fn model(&self) -> &str {
        self.generator.model()
    }
}

impl fmt::Display for DeckAssistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeckAssistant(model={}, policy={:?})",
            self.generator.model(),
            self.policy
        )
    }
}

//! Async wrapper around [`DeckAssistant`] for use in async runtimes.
//!
//! Turns are blocking, sequential I/O (generation plus validation network
//! calls), so they run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free. The
//! wrapper also owns a [`SessionStore`], so callers address conversations by
//! id instead of holding session state themselves.
//!
//! # Example
//!
//! ```no_run
//! use deckwright::{AsyncDeckAssistant, TurnRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let assistant = AsyncDeckAssistant::builder().build().await.unwrap();
//!
//!     let reply = assistant
//!         .turn(
//!             "demo",
//!             TurnRequest {
//!                 message: "Build me a goblin tribal deck".to_string(),
//!                 deck_price: 0.0,
//!             },
//!         )
//!         .await
//!         .unwrap();
//!     println!("{}", reply.message);
//! }
//! ```

use std::sync::Arc;

use crate::assembler::{TurnRequest, ValidationPolicy};
use crate::error::{AssistantError, Result};
use crate::generate::Generate;
use crate::models::TurnReply;
use crate::scryfall::CardLookup;
use crate::session::SessionStore;
use crate::synergy::SynergyFetch;
use crate::DeckAssistant;

// ---------------------------------------------------------------------------
// AsyncDeckAssistantBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncDeckAssistant`].
#[derive(Default)]
pub struct AsyncDeckAssistantBuilder {
    inner: crate::DeckAssistantBuilder,
}

impl AsyncDeckAssistantBuilder {
    pub fn generator(mut self, generator: Box<dyn Generate>) -> Self {
        self.inner = self.inner.generator(generator);
        self
    }

    pub fn card_lookup(mut self, lookup: Box<dyn CardLookup>) -> Self {
        self.inner = self.inner.card_lookup(lookup);
        self
    }

    pub fn synergy_fetch(mut self, fetch: Box<dyn SynergyFetch>) -> Self {
        self.inner = self.inner.synergy_fetch(fetch);
        self
    }

    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.inner = self.inner.policy(policy);
        self
    }

    pub fn telemetry_file(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.inner = self.inner.telemetry_file(path);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.inner = self.inner.system_prompt(prompt);
        self
    }

    /// Build the async assistant. Construction runs on the blocking pool
    /// since the default collaborators build HTTP clients.
    pub async fn build(self) -> Result<AsyncDeckAssistant> {
        let inner = self.inner;
        tokio::task::spawn_blocking(move || {
            let assistant = inner.build()?;
            let sessions = assistant.session_store();
            Ok(AsyncDeckAssistant {
                inner: Arc::new(assistant),
                sessions: Arc::new(sessions),
            })
        })
        .await
        .map_err(|e| AssistantError::Generation(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncDeckAssistant
// ---------------------------------------------------------------------------

/// Async facade over [`DeckAssistant`] plus a conversation-keyed
/// [`SessionStore`].
pub struct AsyncDeckAssistant {
    inner: Arc<DeckAssistant>,
    sessions: Arc<SessionStore>,
}

impl AsyncDeckAssistant {
    /// Create a new builder for configuring the async assistant.
    pub fn builder() -> AsyncDeckAssistantBuilder {
        AsyncDeckAssistantBuilder::default()
    }

    /// Run one turn for the given conversation id on the blocking pool.
    pub async fn turn(&self, conversation_id: &str, request: TurnRequest) -> Result<TurnReply> {
        let assistant = self.inner.clone();
        let sessions = self.sessions.clone();
        let id = conversation_id.to_string();
        tokio::task::spawn_blocking(move || {
            Ok(sessions.with_session(&id, |session| assistant.turn(session, &request)))
        })
        .await
        .map_err(|e| AssistantError::Generation(format!("Task join error: {e}")))?
    }

    /// Reset the given conversation to its pristine state.
    pub async fn reset(&self, conversation_id: &str) -> Result<()> {
        let sessions = self.sessions.clone();
        let id = conversation_id.to_string();
        tokio::task::spawn_blocking(move || {
            sessions.reset(&id);
            Ok(())
        })
        .await
        .map_err(|e| AssistantError::Generation(format!("Task join error: {e}")))?
    }

    /// Model identifier of the configured generation backend.
    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

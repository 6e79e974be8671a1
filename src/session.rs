//! Conversation state: one session per conversation id.
//!
//! A [`Session`] is the rolling turn history plus the last known-good deck
//! and its metadata. [`SessionStore`] keys sessions by conversation id and
//! serializes mutation per key, so concurrent conversations never interleave
//! inside one session's turn.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::{ChatMessage, Deck, DeckMeta};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State of one conversation. The history always begins with exactly one
/// system turn; each successful exchange appends a user turn and a compacted
/// assistant turn (message only, never the full deck, to bound prompt size).
#[derive(Debug, Clone)]
pub struct Session {
    history: Vec<ChatMessage>,
    pub deck: Deck,
    pub meta: DeckMeta,
}

impl Session {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            history: vec![ChatMessage::system(system_prompt)],
            deck: Deck::default(),
            meta: DeckMeta::default(),
        }
    }

    /// Discard everything except the system turn; clear deck and metadata.
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.deck = Deck::default();
        self.meta = DeckMeta::default();
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The instruction prompt this session opened with.
    pub fn system_turn(&self) -> &ChatMessage {
        &self.history[0]
    }

    /// The most recent `window` turns after the system turn.
    pub fn recent_turns(&self, window: usize) -> &[ChatMessage] {
        let tail = &self.history[1..];
        &tail[tail.len().saturating_sub(window)..]
    }

    /// Record one completed exchange. Called only after a turn fully
    /// succeeds, so a mid-pipeline failure never leaves the history
    /// half-updated.
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.history.push(user);
        self.history.push(assistant);
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Sessions keyed by conversation id, each behind its own lock.
///
/// The outer map lock is held only long enough to clone the per-session
/// handle; the session lock is held for the duration of the closure, so a
/// slow turn in one conversation never blocks another.
pub struct SessionStore {
    system_prompt: String,
    inner: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn handle(&self, id: &str) -> Arc<Mutex<Session>> {
        let mut map = lock_or_recover(&self.inner);
        map.entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(self.system_prompt.clone()))))
            .clone()
    }

    /// Run `f` against the session for `id`, creating it on first use.
    pub fn with_session<T>(&self, id: &str, f: impl FnOnce(&mut Session) -> T) -> T {
        let handle = self.handle(id);
        let mut session = lock_or_recover(&handle);
        f(&mut session)
    }

    /// Reset the session for `id` to its pristine state.
    pub fn reset(&self, id: &str) {
        self.with_session(id, Session::reset);
    }

    pub fn len(&self) -> usize {
        lock_or_recover(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A poisoned session lock means a panic mid-turn; the state is still the
/// last committed one (history updates only on success), so recover it.
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

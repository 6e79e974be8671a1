use deckwright::AsyncDeckAssistant;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// The async assistant. Owns the session store and dispatches blocking
    /// turns (generation + validation I/O) to a thread pool internally.
    pub assistant: AsyncDeckAssistant,
}

//! Session and session-store behavior.

use deckwright::models::{ChatMessage, Role};
use deckwright::{Session, SessionStore};

const PROMPT: &str = "You are a deck-building assistant.";

#[test]
fn new_session_holds_only_the_system_turn() {
    let session = Session::new(PROMPT);

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.system_turn().role, Role::System);
    assert_eq!(session.system_turn().content, PROMPT);
    assert!(session.deck.is_empty());
    assert_eq!(session.meta.theme, "None");
}

#[test]
fn reset_returns_to_pristine_state() {
    let mut session = Session::new(PROMPT);
    session.record_exchange(
        ChatMessage::user("build a deck"),
        ChatMessage::assistant("done"),
    );
    session.deck.commander.push("Krenko, Mob Boss".to_string());
    session.meta.theme = "Goblins".to_string();
    session.meta.requested_price = 150.0;

    session.reset();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.system_turn().content, PROMPT);
    assert!(session.deck.is_empty());
    assert_eq!(session.meta.theme, "None");
    assert_eq!(session.meta.requested_price, 0.0);
}

#[test]
fn recent_turns_returns_a_bounded_tail() {
    let mut session = Session::new(PROMPT);
    for i in 0..3 {
        session.record_exchange(
            ChatMessage::user(format!("user {i}")),
            ChatMessage::assistant(format!("assistant {i}")),
        );
    }

    let recent = session.recent_turns(4);
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].content, "user 1");
    assert_eq!(recent[3].content, "assistant 2");

    // A window wider than the history just returns everything after the
    // system turn.
    assert_eq!(session.recent_turns(100).len(), 6);
}

#[test]
fn store_keeps_conversations_isolated() {
    let store = SessionStore::new(PROMPT);

    store.with_session("alice", |session| {
        session.deck.commander.push("Krenko, Mob Boss".to_string());
    });

    let alice_commander =
        store.with_session("alice", |session| session.deck.commander.clone());
    let bob_commander = store.with_session("bob", |session| session.deck.commander.clone());

    assert_eq!(alice_commander, vec!["Krenko, Mob Boss"]);
    assert!(bob_commander.is_empty());
    assert_eq!(store.len(), 2);
}

#[test]
fn store_reset_clears_only_that_conversation() {
    let store = SessionStore::new(PROMPT);
    store.with_session("alice", |session| {
        session.deck.lands.push("Forest".to_string());
    });
    store.with_session("bob", |session| {
        session.deck.lands.push("Mountain".to_string());
    });

    store.reset("alice");

    assert!(store.with_session("alice", |session| session.deck.is_empty()));
    assert!(!store.with_session("bob", |session| session.deck.is_empty()));
}

#[test]
fn store_creates_sessions_lazily() {
    let store = SessionStore::new(PROMPT);
    assert!(store.is_empty());

    store.with_session("alice", |_| ());
    assert_eq!(store.len(), 1);
}

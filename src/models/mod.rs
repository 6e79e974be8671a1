pub mod deck;
pub mod message;
pub mod response;

pub use deck::{Deck, DeckMeta};
pub use message::{ChatMessage, Role};
pub use response::{DeckResponse, ParsedReply, TurnReply};

//! Decks: slots, storage interfaces and management commands.
//!
//! Every player has three deck slots (A, B, C) per server. A deck is
//! usable in a duel only when it holds exactly `DECK_SIZE` cards.

pub mod slot;
pub mod store;
pub mod commands;

pub use slot::{Deck, DeckSlot, DECK_SIZE};
pub use store::{DeckStore, InventoryStore, MemoryStore};
pub use commands::{add_card, deck_listing, remove_card};

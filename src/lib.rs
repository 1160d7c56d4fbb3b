//! # duel-engine
//!
//! A session engine for turn-based two-player card duels played through a
//! chat platform.
//!
//! ## Design Principles
//!
//! 1. **Host-Driven**: The engine never reads a wall clock, owns no
//!    threads and performs no I/O. Hosts post player input, advance the
//!    logical clock and deliver the outbox.
//!
//! 2. **Deterministic**: Every session draws from its own forked RNG, so a
//!    seed plus an input log replays a duel exactly.
//!
//! 3. **One Writer Per Session**: All mutation of a duel goes through its
//!    inbox, one event at a time.
//!
//! ## Modules
//!
//! - `core`: Players, sides, RNG, configuration, logical time, errors
//! - `cards`: Card records and the catalog interface
//! - `decks`: Deck slots, storage interfaces, deck management commands
//! - `duel`: Session registry, state machine, timers, resolver, engine
//!
//! ## Logging
//!
//! Lifecycle transitions are emitted through `tracing`. Installing a
//! subscriber is left to the host.

pub mod core;
pub mod cards;
pub mod decks;
pub mod duel;

// Re-export commonly used types
pub use crate::core::{
    ChannelId, PlayerId, PlayerIdentity, ServerId, Side, SideMap,
    DuelRng, DuelRngState,
    DuelConfig, ConfigIssue, Tick,
    DuelError, DeckError, StorageError, TargetIssue,
};

pub use crate::cards::{Card, CardCatalog, CardId, CardRegistry, Rarity, Stat};

pub use crate::decks::{add_card, deck_listing, remove_card, Deck, DeckSlot, DeckStore, InventoryStore, MemoryStore, DECK_SIZE};

pub use crate::duel::{
    Announcement, CancelReason, CardOption, DrawReason, DuelEngine, DuelEvent, DuelOutcome, DuelPhase,
    DuelSession, Outbound, RoundResult, RoundStage, SessionKey, SessionRegistry, WinReason,
};

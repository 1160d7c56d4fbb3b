//! Core engine types: players, sides, RNG, configuration, errors.
//!
//! Everything here is independent of the duel rules themselves.

pub mod player;
pub mod rng;
pub mod config;
pub mod error;

pub use player::{ChannelId, PlayerId, PlayerIdentity, ServerId, Side, SideMap};
pub use rng::{DuelRng, DuelRngState};
pub use config::{ConfigIssue, DuelConfig, Tick};
pub use error::{DeckError, DuelError, StorageError, TargetIssue};

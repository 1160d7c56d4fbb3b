//! Error types for duels, storage and deck management.
//!
//! None of these are fatal to the engine. Inside a running session they
//! end or cancel that one duel; at the input boundary they are returned
//! to the caller and mirrored to the sender as a notice.

use thiserror::Error;

use super::player::PlayerId;
use crate::decks::DeckSlot;

/// Failure of an external collaborator (deck store, inventory, catalog).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Why a challenge target is not acceptable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetIssue {
    /// The challenger named themselves.
    SelfChallenge,
    /// The target is an automated account.
    NotPlayable,
}

impl std::fmt::Display for TargetIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetIssue::SelfChallenge => f.write_str("you cannot challenge yourself"),
            TargetIssue::NotPlayable => f.write_str("that account cannot duel"),
        }
    }
}

/// Errors raised by the duel engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DuelError {
    #[error("invalid target: {0}")]
    InvalidTarget(TargetIssue),

    #[error("{0} has no full deck")]
    NoFullDeck(PlayerId),

    #[error("a duel between these players is already active")]
    AlreadyActive,

    #[error("deck {slot} of {player} is no longer full")]
    DeckInvalidatedMidSelection { player: PlayerId, slot: DeckSlot },

    #[error("no response in time")]
    Timeout,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("no active duel for these players")]
    UnknownSession,

    #[error("this prompt belongs to another player")]
    NotYourPrompt,

    #[error("that action is not expected right now")]
    UnexpectedInput,

    #[error("card slot {0} is not available")]
    SlotUnavailable(usize),

    #[error("deck {0} was not offered")]
    DeckNotOffered(DeckSlot),
}

impl From<StorageError> for DuelError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(msg) => DuelError::StorageUnavailable(msg),
        }
    }
}

/// Errors raised by deck management commands.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("no card found with the name '{0}'")]
    CardNotFound(String),

    #[error("you do not own the card '{0}'")]
    NotOwned(String),

    #[error("deck {slot} already has {size} cards, remove one to add another")]
    DeckFull { slot: DeckSlot, size: usize },

    #[error("you only own {owned} copies of '{name}', so you cannot add more to your decks")]
    NoSpareCopies { name: String, owned: usize },

    #[error("the card '{name}' is not in deck {slot}")]
    NotInDeck { name: String, slot: DeckSlot },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_converts_to_duel_error() {
        let err: DuelError = StorageError::Unavailable("timeout".into()).into();
        assert_eq!(err, DuelError::StorageUnavailable("timeout".into()));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            DuelError::InvalidTarget(TargetIssue::SelfChallenge).to_string(),
            "invalid target: you cannot challenge yourself"
        );
        assert_eq!(
            DuelError::NoFullDeck(PlayerId::new(4)).to_string(),
            "Player(4) has no full deck"
        );
        assert_eq!(
            DeckError::DeckFull { slot: DeckSlot::B, size: 8 }.to_string(),
            "deck B already has 8 cards, remove one to add another"
        );
    }

    #[test]
    fn test_deck_error_from_storage() {
        let err: DeckError = StorageError::Unavailable("down".into()).into();
        assert_eq!(err.to_string(), "storage unavailable: down");
    }
}

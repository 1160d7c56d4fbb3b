//! Deck slots and deck snapshots.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;

/// Cards in a full deck. Only full decks can be taken into a duel.
pub const DECK_SIZE: usize = 8;

/// One of the three named deck slots every player has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeckSlot {
    A,
    B,
    C,
}

impl DeckSlot {
    /// Every slot, in display order.
    pub const ALL: [DeckSlot; 3] = [DeckSlot::A, DeckSlot::B, DeckSlot::C];

    /// Parse a slot letter, ignoring case.
    #[must_use]
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "A" => Some(DeckSlot::A),
            "B" => Some(DeckSlot::B),
            "C" => Some(DeckSlot::C),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeckSlot::A => "A",
            DeckSlot::B => "B",
            DeckSlot::C => "C",
        };
        f.write_str(s)
    }
}

/// Ordered card ids of one deck slot.
///
/// Positions in the deck are the "slot indices" players pick from when
/// revealing a card. Inline storage covers a full deck without allocating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Deck {
    cards: SmallVec<[CardId; DECK_SIZE]>,
}

impl Deck {
    /// Create an empty deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a deck from card ids in order.
    #[must_use]
    pub fn from_cards(cards: &[CardId]) -> Self {
        Self {
            cards: SmallVec::from_slice(cards),
        }
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the deck holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether the deck holds exactly `DECK_SIZE` cards.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cards.len() == DECK_SIZE
    }

    /// Card at a slot index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CardId> {
        self.cards.get(index).copied()
    }

    /// All card ids in order.
    #[must_use]
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }

    /// Copies of a card in this deck.
    #[must_use]
    pub fn count(&self, id: CardId) -> usize {
        self.cards.iter().filter(|&&c| c == id).count()
    }

    /// Append a card. The caller enforces the size cap.
    pub fn push(&mut self, id: CardId) {
        self.cards.push(id);
    }

    /// Remove the first copy of a card. Returns false if absent.
    pub fn remove_one(&mut self, id: CardId) -> bool {
        match self.cards.iter().position(|&c| c == id) {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }
}

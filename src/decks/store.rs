//! Deck and inventory storage interfaces.
//!
//! Persistence is owned by the host. The engine only reads decks through
//! `DeckStore::load`, and always re-reads at the point of use because
//! other commands may modify a deck at any time.

use rustc_hash::FxHashMap;

use super::slot::{Deck, DeckSlot};
use crate::cards::CardId;
use crate::core::{PlayerId, ServerId, StorageError};

/// Read/write access to players' deck slots.
pub trait DeckStore {
    /// Load one deck slot. A slot never written is an empty deck.
    fn load(&self, server: ServerId, player: PlayerId, slot: DeckSlot) -> Result<Deck, StorageError>;

    /// Replace one deck slot.
    fn save(
        &mut self,
        server: ServerId,
        player: PlayerId,
        slot: DeckSlot,
        deck: Deck,
    ) -> Result<(), StorageError>;

    /// Slots currently holding a full deck, in slot order.
    fn full_slots(&self, server: ServerId, player: PlayerId) -> Result<Vec<DeckSlot>, StorageError> {
        let mut slots = Vec::new();
        for slot in DeckSlot::ALL {
            if self.load(server, player, slot)?.is_full() {
                slots.push(slot);
            }
        }
        Ok(slots)
    }
}

/// Read access to the cards a player owns, one entry per copy.
pub trait InventoryStore {
    fn owned_cards(&self, server: ServerId, player: PlayerId) -> Result<Vec<CardId>, StorageError>;
}

/// In-memory deck and inventory storage.
///
/// `set_available(false)` makes every call fail, which lets hosts and
/// tests exercise storage outages.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    decks: FxHashMap<(ServerId, PlayerId, DeckSlot), Deck>,
    inventories: FxHashMap<(ServerId, PlayerId), Vec<CardId>>,
    available: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            decks: FxHashMap::default(),
            inventories: FxHashMap::default(),
            available: true,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a player copies of cards.
    pub fn grant(&mut self, server: ServerId, player: PlayerId, cards: &[CardId]) {
        self.inventories
            .entry((server, player))
            .or_default()
            .extend_from_slice(cards);
    }

    /// Write a deck directly, bypassing the deck commands.
    pub fn put_deck(&mut self, server: ServerId, player: PlayerId, slot: DeckSlot, deck: Deck) {
        self.decks.insert((server, player, slot), deck);
    }

    /// Toggle simulated availability.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store offline".to_string()))
        }
    }
}

impl DeckStore for MemoryStore {
    fn load(&self, server: ServerId, player: PlayerId, slot: DeckSlot) -> Result<Deck, StorageError> {
        self.check()?;
        Ok(self
            .decks
            .get(&(server, player, slot))
            .cloned()
            .unwrap_or_default())
    }

    fn save(
        &mut self,
        server: ServerId,
        player: PlayerId,
        slot: DeckSlot,
        deck: Deck,
    ) -> Result<(), StorageError> {
        self.check()?;
        self.decks.insert((server, player, slot), deck);
        Ok(())
    }
}

impl InventoryStore for MemoryStore {
    fn owned_cards(&self, server: ServerId, player: PlayerId) -> Result<Vec<CardId>, StorageError> {
        self.check()?;
        Ok(self
            .inventories
            .get(&(server, player))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: ServerId = ServerId::new(1);
    const PLAYER: PlayerId = PlayerId::new(10);

    fn full_deck() -> Deck {
        let cards: Vec<_> = (1..=8).map(CardId::new).collect();
        Deck::from_cards(&cards)
    }

    #[test]
    fn test_unwritten_slot_is_empty() {
        let store = MemoryStore::new();
        let deck = store.load(SERVER, PLAYER, DeckSlot::A).unwrap();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        store.save(SERVER, PLAYER, DeckSlot::B, full_deck()).unwrap();

        assert_eq!(store.load(SERVER, PLAYER, DeckSlot::B).unwrap(), full_deck());
        // Decks are scoped per server.
        assert!(store.load(ServerId::new(2), PLAYER, DeckSlot::B).unwrap().is_empty());
    }

    #[test]
    fn test_full_slots() {
        let mut store = MemoryStore::new();
        store.put_deck(SERVER, PLAYER, DeckSlot::A, Deck::from_cards(&[CardId::new(1)]));
        store.put_deck(SERVER, PLAYER, DeckSlot::C, full_deck());

        assert_eq!(store.full_slots(SERVER, PLAYER).unwrap(), vec![DeckSlot::C]);
    }

    #[test]
    fn test_unavailable() {
        let mut store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.load(SERVER, PLAYER, DeckSlot::A),
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.owned_cards(SERVER, PLAYER).is_err());
        assert!(store.full_slots(SERVER, PLAYER).is_err());
    }

    #[test]
    fn test_grant_accumulates() {
        let mut store = MemoryStore::new();
        store.grant(SERVER, PLAYER, &[CardId::new(1)]);
        store.grant(SERVER, PLAYER, &[CardId::new(1), CardId::new(2)]);

        assert_eq!(store.owned_cards(SERVER, PLAYER).unwrap().len(), 3);
    }
}

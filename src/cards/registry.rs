//! Card catalog lookup.
//!
//! `CardCatalog` is the narrow read-only interface the engine consumes.
//! `CardRegistry` is the in-memory implementation, loadable from the JSON
//! card list the bot ships with.

use rustc_hash::FxHashMap;

use super::definition::{Card, CardId};

/// Read-only card lookup.
pub trait CardCatalog {
    /// Get a card by ID.
    fn lookup(&self, id: CardId) -> Option<Card>;

    /// Every card in the catalog.
    fn all(&self) -> Vec<Card>;

    /// Find a card by exact name, ignoring case.
    fn find_by_name(&self, name: &str) -> Option<Card> {
        let wanted = name.to_lowercase();
        self.all().into_iter().find(|c| c.name.to_lowercase() == wanted)
    }
}

/// In-memory card catalog.
///
/// ## Example
///
/// ```
/// use duel_engine::cards::{Card, CardCatalog, CardId, CardRegistry, Rarity};
///
/// let mut registry = CardRegistry::new();
/// registry.register(Card::new(CardId::new(1), "Majima", Rarity::SSR));
///
/// assert_eq!(registry.lookup(CardId::new(1)).unwrap().name, "Majima");
/// assert!(registry.find_by_name("majima").is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Card>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON array of cards.
    ///
    /// Later entries with a duplicate id replace earlier ones.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let cards: Vec<Card> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for card in cards {
            registry.cards.insert(card.id, card);
        }
        Ok(registry)
    }

    /// Register a card.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: Card) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {:?} already registered", card.id);
        }
        self.cards.insert(card.id, card);
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards.
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

impl CardCatalog for CardRegistry {
    fn lookup(&self, id: CardId) -> Option<Card> {
        self.cards.get(&id).cloned()
    }

    fn all(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = self.cards.values().cloned().collect();
        cards.sort_by_key(|c| c.id);
        cards
    }

    fn find_by_name(&self, name: &str) -> Option<Card> {
        let wanted = name.to_lowercase();
        self.cards
            .values()
            .filter(|c| c.name.to_lowercase() == wanted)
            .min_by_key(|c| c.id)
            .cloned()
    }
}

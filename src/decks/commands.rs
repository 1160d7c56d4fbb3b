//! Deck management commands.
//!
//! `deck_listing` is read-only. Adding a card enforces three rules:
//! - the deck holds at most `DECK_SIZE` cards
//! - the player must own the card
//! - a card cannot sit in more deck slots, across all three decks,
//!   than the player owns copies of it

use tracing::info;

use super::slot::{DeckSlot, DECK_SIZE};
use super::store::{DeckStore, InventoryStore};
use crate::cards::{Card, CardCatalog};
use crate::core::{DeckError, PlayerId, ServerId};

/// Add one copy of a named card to a deck slot.
///
/// Returns the card that was added.
pub fn add_card<S, C>(
    store: &mut S,
    catalog: &C,
    server: ServerId,
    player: PlayerId,
    slot: DeckSlot,
    card_name: &str,
) -> Result<Card, DeckError>
where
    S: DeckStore + InventoryStore,
    C: CardCatalog,
{
    let card = catalog
        .find_by_name(card_name)
        .ok_or_else(|| DeckError::CardNotFound(card_name.to_string()))?;

    let owned = store
        .owned_cards(server, player)?
        .iter()
        .filter(|&&c| c == card.id)
        .count();
    if owned == 0 {
        return Err(DeckError::NotOwned(card.name));
    }

    let mut deck = store.load(server, player, slot)?;
    if deck.len() >= DECK_SIZE {
        return Err(DeckError::DeckFull { slot, size: DECK_SIZE });
    }

    let mut placed = 0;
    for other in DeckSlot::ALL {
        placed += if other == slot {
            deck.count(card.id)
        } else {
            store.load(server, player, other)?.count(card.id)
        };
    }
    if placed >= owned {
        return Err(DeckError::NoSpareCopies { name: card.name, owned });
    }

    deck.push(card.id);
    store.save(server, player, slot, deck)?;

    info!(%server, %player, %slot, card = %card.name, "card added to deck");
    Ok(card)
}

/// Remove one copy of a named card from a deck slot.
///
/// Returns the card that was removed.
pub fn remove_card<S, C>(
    store: &mut S,
    catalog: &C,
    server: ServerId,
    player: PlayerId,
    slot: DeckSlot,
    card_name: &str,
) -> Result<Card, DeckError>
where
    S: DeckStore,
    C: CardCatalog,
{
    let card = catalog
        .find_by_name(card_name)
        .ok_or_else(|| DeckError::CardNotFound(card_name.to_string()))?;

    let mut deck = store.load(server, player, slot)?;
    if !deck.remove_one(card.id) {
        return Err(DeckError::NotInDeck { name: card.name, slot });
    }
    store.save(server, player, slot, deck)?;

    info!(%server, %player, %slot, card = %card.name, "card removed from deck");
    Ok(card)
}

/// Cards in a deck slot, in deck order. An empty slot lists nothing.
///
/// A card id missing from the catalog is reported as `CardNotFound`.
pub fn deck_listing<S, C>(
    store: &S,
    catalog: &C,
    server: ServerId,
    player: PlayerId,
    slot: DeckSlot,
) -> Result<Vec<Card>, DeckError>
where
    S: DeckStore,
    C: CardCatalog,
{
    store
        .load(server, player, slot)?
        .cards()
        .iter()
        .map(|&id| catalog.lookup(id).ok_or_else(|| DeckError::CardNotFound(id.to_string())))
        .collect()
}

//! Deck management and how it gates challenges.

mod common;

use common::*;
use duel_engine::cards::{Card, CardCatalog, CardId, CardRegistry, Rarity};
use duel_engine::core::{DeckError, DuelConfig, DuelError, PlayerId};
use duel_engine::decks::{add_card, remove_card, Deck, DeckSlot, DeckStore, MemoryStore, DECK_SIZE};
use duel_engine::duel::DuelEngine;

const CATALOG_JSON: &str = r#"[
    {"id": 1, "name": "Dragon of Dojima", "rarity": "UR", "health": 1100, "attack": 320, "defense": 260, "speed": 180},
    {"id": 2, "name": "Mad Dog", "rarity": "KSR", "health": 950, "attack": 300, "defense": 200, "speed": 260},
    {"id": 3, "name": "Street Thug", "health": 300, "attack": 80, "defense": 60, "speed": 90}
]"#;

fn player() -> PlayerId {
    kiryu().id
}

fn catalog() -> CardRegistry {
    CardRegistry::from_json(CATALOG_JSON).unwrap()
}

/// Players with only partial decks cannot be challenged, and no duel starts.
#[test]
fn test_partial_decks_block_challenge() {
    let mut catalog = CardRegistry::new();
    register_flat(&mut catalog, 0, [100; 8]);
    let mut store = MemoryStore::new();
    store.put_deck(SERVER, kiryu().id, DeckSlot::A, Deck::from_cards(&ids(0)));
    store.put_deck(SERVER, majima().id, DeckSlot::B, Deck::from_cards(&ids(0)[..6]));

    let mut engine = DuelEngine::new(catalog, store, DuelConfig::default(), 1).unwrap();
    let err = engine.challenge(SERVER, kiryu(), majima(), CHANNEL).unwrap_err();

    assert_eq!(err, DuelError::NoFullDeck(majima().id));
    assert_eq!(engine.active_duels(), 0);
    let notices = notices_to(&engine.drain_outbox(), kiryu().id);
    assert_eq!(notices, vec!["Player(2) has no full deck".to_string()]);
}

/// The challenger needs a full deck too.
#[test]
fn test_challenger_needs_full_deck() {
    let mut engine = setup(DuelConfig::default(), [100; 8], [100; 8]);
    engine.decks_mut().put_deck(SERVER, kiryu().id, DeckSlot::A, Deck::new());

    let err = engine.challenge(SERVER, kiryu(), majima(), CHANNEL).unwrap_err();
    assert_eq!(err, DuelError::NoFullDeck(kiryu().id));
}

/// Building a deck card by card makes it playable.
#[test]
fn test_building_full_deck() {
    let catalog = catalog();
    let mut store = MemoryStore::new();
    store.grant(SERVER, player(), &[CardId::new(3); DECK_SIZE]);

    for _ in 0..DECK_SIZE {
        add_card(&mut store, &catalog, SERVER, player(), DeckSlot::C, "street thug").unwrap();
    }
    assert_eq!(store.full_slots(SERVER, player()).unwrap(), vec![DeckSlot::C]);

    let err = add_card(&mut store, &catalog, SERVER, player(), DeckSlot::C, "Street Thug").unwrap_err();
    assert_eq!(err, DeckError::DeckFull { slot: DeckSlot::C, size: DECK_SIZE });
}

/// Copies placed across all three slots never exceed copies owned.
#[test]
fn test_copy_limit_across_slots() {
    let catalog = catalog();
    let mut store = MemoryStore::new();
    store.grant(SERVER, player(), &[CardId::new(1), CardId::new(1)]);

    add_card(&mut store, &catalog, SERVER, player(), DeckSlot::A, "Dragon of Dojima").unwrap();
    add_card(&mut store, &catalog, SERVER, player(), DeckSlot::B, "Dragon of Dojima").unwrap();

    let err = add_card(&mut store, &catalog, SERVER, player(), DeckSlot::C, "Dragon of Dojima").unwrap_err();
    assert_eq!(
        err,
        DeckError::NoSpareCopies { name: "Dragon of Dojima".into(), owned: 2 }
    );
    assert!(store.load(SERVER, player(), DeckSlot::C).unwrap().is_empty());

    // Freeing a copy makes room again.
    remove_card(&mut store, &catalog, SERVER, player(), DeckSlot::A, "Dragon of Dojima").unwrap();
    add_card(&mut store, &catalog, SERVER, player(), DeckSlot::C, "Dragon of Dojima").unwrap();
}

/// Unowned cards cannot be added.
#[test]
fn test_unowned_card() {
    let mut store = MemoryStore::new();
    store.grant(SERVER, player(), &[CardId::new(1)]);

    let err = add_card(&mut store, &catalog(), SERVER, player(), DeckSlot::A, "Mad Dog").unwrap_err();
    assert_eq!(err, DeckError::NotOwned("Mad Dog".into()));
}

/// Storage outages surface as deck errors.
#[test]
fn test_deck_command_storage_outage() {
    let mut store = MemoryStore::new();
    store.set_available(false);

    let err = add_card(&mut store, &catalog(), SERVER, player(), DeckSlot::A, "Mad Dog").unwrap_err();
    assert!(matches!(err, DeckError::Storage(_)));
}

/// Catalog JSON defaults missing rarity and image.
#[test]
fn test_catalog_from_json() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 3);

    let thug = catalog.find_by_name("STREET THUG").unwrap();
    assert_eq!(thug.rarity, Rarity::N);
    assert_eq!(thug.image, None);

    let all: Vec<CardId> = catalog.all().iter().map(|c: &Card| c.id).collect();
    assert_eq!(all, vec![CardId::new(1), CardId::new(2), CardId::new(3)]);
}

/// Decks edited during a running duel do not touch the locked snapshot.
#[test]
fn test_locked_deck_is_a_snapshot() {
    let mut engine = setup(DuelConfig::default(), [100; 8], [100; 8]);
    let key = start_duel(&mut engine);

    engine.decks_mut().put_deck(SERVER, kiryu().id, DeckSlot::A, Deck::new());

    let session = engine.session(&key).unwrap();
    assert!(session.deck(duel_engine::core::Side::A).unwrap().is_full());
    play_round(&mut engine, key, 0, 0);
    assert_eq!(engine.session(&key).unwrap().round(), 2);
}

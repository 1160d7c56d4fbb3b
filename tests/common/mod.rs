//! Shared fixtures for duel integration tests.
//!
//! Kiryu (player 1) plays cards 1..=8, Majima (player 2) cards 11..=18.
//! Every card carries the same value in all four stats, so a round's
//! winner does not depend on which stats were drawn.

#![allow(dead_code)]

use duel_engine::cards::{Card, CardId, CardRegistry, Rarity};
use duel_engine::core::{ChannelId, DuelConfig, PlayerId, PlayerIdentity, ServerId};
use duel_engine::decks::{Deck, DeckSlot, MemoryStore};
use duel_engine::duel::{Announcement, DuelEngine, Outbound, SessionKey};

pub const SERVER: ServerId = ServerId::new(1);
pub const CHANNEL: ChannelId = ChannelId::new(77);

pub type Engine = DuelEngine<CardRegistry, MemoryStore>;

pub fn kiryu() -> PlayerIdentity {
    PlayerIdentity::new(PlayerId::new(1), "Kiryu")
}

pub fn majima() -> PlayerIdentity {
    PlayerIdentity::new(PlayerId::new(2), "Majima")
}

pub fn saejima() -> PlayerIdentity {
    PlayerIdentity::new(PlayerId::new(3), "Saejima")
}

pub fn ids(base: u32) -> Vec<CardId> {
    (base + 1..=base + 8).map(CardId::new).collect()
}

/// Register eight flat cards starting after `base`.
pub fn register_flat(catalog: &mut CardRegistry, base: u32, values: [i64; 8]) {
    for (id, value) in ids(base).into_iter().zip(values) {
        let card = Card::new(id, format!("Card {}", id.raw()), Rarity::R).with_stats(value, value, value, value);
        catalog.register(card);
    }
}

/// Engine with full decks in slot A for Kiryu and Majima.
pub fn setup(config: DuelConfig, kiryu_values: [i64; 8], majima_values: [i64; 8]) -> Engine {
    let mut catalog = CardRegistry::new();
    register_flat(&mut catalog, 0, kiryu_values);
    register_flat(&mut catalog, 10, majima_values);

    let mut store = MemoryStore::new();
    store.put_deck(SERVER, kiryu().id, DeckSlot::A, Deck::from_cards(&ids(0)));
    store.put_deck(SERVER, majima().id, DeckSlot::A, Deck::from_cards(&ids(10)));

    DuelEngine::new(catalog, store, config, 42).expect("valid config")
}

/// Challenge, accept and lock both decks. Round 1 is waiting on reveals.
pub fn start_duel(engine: &mut Engine) -> SessionKey {
    let key = engine
        .challenge(SERVER, kiryu(), majima(), CHANNEL)
        .expect("challenge accepted");
    engine.answer(key, majima().id, true).expect("answer");
    engine.choose_deck(key, kiryu().id, DeckSlot::A).expect("kiryu deck");
    engine.choose_deck(key, majima().id, DeckSlot::A).expect("majima deck");
    key
}

/// Both players reveal, Kiryu first.
pub fn play_round(engine: &mut Engine, key: SessionKey, kiryu_index: usize, majima_index: usize) {
    engine.reveal(key, kiryu().id, kiryu_index).expect("kiryu reveal");
    engine.reveal(key, majima().id, majima_index).expect("majima reveal");
}

pub fn announcements(out: &[Outbound]) -> Vec<Announcement> {
    out.iter()
        .filter_map(|o| match o {
            Outbound::Public { announcement, .. } => Some(announcement.clone()),
            _ => None,
        })
        .collect()
}

pub fn terminal_announcements(out: &[Outbound]) -> Vec<Announcement> {
    announcements(out).into_iter().filter(|a| a.is_terminal()).collect()
}

pub fn notices_to(out: &[Outbound], player: PlayerId) -> Vec<String> {
    out.iter()
        .filter_map(|o| match o {
            Outbound::Notice { to, text } if *to == player => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn card_prompts(out: &[Outbound]) -> usize {
    out.iter()
        .filter(|o| matches!(o, Outbound::CardPrompt { .. }))
        .count()
}

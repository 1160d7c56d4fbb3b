//! The duel engine: challenge intake, event processing and clock.
//!
//! ## Event flow
//!
//! 1. `challenge` validates the request and registers a proposed session.
//! 2. Platform input becomes a `DuelEvent` posted to the session inbox
//!    (`post`), then processed in order (`process`). `dispatch` does both.
//! 3. `advance_to` moves the logical clock and turns due timers into
//!    `TimersExpired` events, one per session per advance.
//! 4. Everything the host must deliver accumulates in the outbox
//!    (`drain_outbox`).
//!
//! A session leaves the registry in the same call that ends it.
//!
//! ## Example
//!
//! ```
//! use duel_engine::cards::{Card, CardId, CardRegistry, Rarity};
//! use duel_engine::core::{ChannelId, DuelConfig, PlayerId, PlayerIdentity, ServerId};
//! use duel_engine::decks::{Deck, DeckSlot, MemoryStore};
//! use duel_engine::duel::DuelEngine;
//!
//! let server = ServerId::new(1);
//! let kiryu = PlayerIdentity::new(PlayerId::new(1), "Kiryu");
//! let majima = PlayerIdentity::new(PlayerId::new(2), "Majima");
//!
//! let mut catalog = CardRegistry::new();
//! let mut store = MemoryStore::new();
//! let cards: Vec<CardId> = (1..=8).map(CardId::new).collect();
//! for &id in &cards {
//!     catalog.register(Card::new(id, format!("Card {}", id.raw()), Rarity::R).with_stats(100, 100, 100, 100));
//! }
//! store.put_deck(server, kiryu.id, DeckSlot::A, Deck::from_cards(&cards));
//! store.put_deck(server, majima.id, DeckSlot::B, Deck::from_cards(&cards));
//!
//! let mut engine = DuelEngine::new(catalog, store, DuelConfig::default(), 7).unwrap();
//! let key = engine.challenge(server, kiryu.clone(), majima.clone(), ChannelId::new(100)).unwrap();
//!
//! engine.answer(key, majima.id, true).unwrap();
//! engine.choose_deck(key, kiryu.id, DeckSlot::A).unwrap();
//! engine.choose_deck(key, majima.id, DeckSlot::B).unwrap();
//!
//! assert_eq!(engine.session(&key).unwrap().round(), 1);
//! ```

use tracing::{debug, info, warn};

use super::events::{DuelEvent, Outbound};
use super::registry::{SessionKey, SessionRegistry};
use super::session::{DuelSession, SessionCtx};
use crate::cards::CardCatalog;
use crate::core::{
    ChannelId, ConfigIssue, DuelConfig, DuelError, DuelRng, PlayerId, PlayerIdentity, ServerId, Side,
    TargetIssue, Tick,
};
use crate::decks::{DeckSlot, DeckStore};

/// Runs every duel on one host.
pub struct DuelEngine<C, D> {
    catalog: C,
    decks: D,
    config: DuelConfig,
    registry: SessionRegistry<DuelSession>,
    rng: DuelRng,
    now: Tick,
    outbox: Vec<Outbound>,
}

impl<C: CardCatalog, D: DeckStore> DuelEngine<C, D> {
    /// Create an engine at time zero.
    ///
    /// Fails if `config` does not validate.
    pub fn new(catalog: C, decks: D, config: DuelConfig, seed: u64) -> Result<Self, ConfigIssue> {
        config.validate()?;
        Ok(Self {
            catalog,
            decks,
            config,
            registry: SessionRegistry::new(),
            rng: DuelRng::new(seed),
            now: Tick::default(),
            outbox: Vec::new(),
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn now(&self) -> Tick {
        self.now
    }

    #[must_use]
    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    #[must_use]
    pub fn decks(&self) -> &D {
        &self.decks
    }

    /// Mutable deck store, for deck commands issued while duels run.
    pub fn decks_mut(&mut self) -> &mut D {
        &mut self.decks
    }

    /// Active session by key.
    #[must_use]
    pub fn session(&self, key: &SessionKey) -> Option<&DuelSession> {
        self.registry.get_by_key(key)
    }

    /// Active session for a pair of players, in either order.
    #[must_use]
    pub fn find(&self, server: ServerId, a: PlayerId, b: PlayerId) -> Option<&DuelSession> {
        self.registry.get(server, a, b)
    }

    /// Number of active duels.
    #[must_use]
    pub fn active_duels(&self) -> usize {
        self.registry.len()
    }

    /// Earliest pending deadline across all duels.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Tick> {
        self.registry
            .keys()
            .iter()
            .filter_map(|k| self.registry.get_by_key(k))
            .filter_map(|s| s.timers().next_due())
            .min()
    }

    /// Take every message emitted so far.
    pub fn drain_outbox(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outbox)
    }

    // === Challenge ===

    /// Propose a duel from `challenger` to `challenged`.
    ///
    /// Rejections create no session and send the challenger a notice.
    pub fn challenge(
        &mut self,
        server: ServerId,
        challenger: PlayerIdentity,
        challenged: PlayerIdentity,
        channel: ChannelId,
    ) -> Result<SessionKey, DuelError> {
        let asker = challenger.id;
        match self.try_challenge(server, challenger, challenged, channel) {
            Ok(key) => Ok(key),
            Err(err) => {
                debug!(%server, challenger = %asker, %err, "challenge rejected");
                self.outbox.push(Outbound::Notice { to: asker, text: err.to_string() });
                Err(err)
            }
        }
    }

    fn try_challenge(
        &mut self,
        server: ServerId,
        challenger: PlayerIdentity,
        challenged: PlayerIdentity,
        channel: ChannelId,
    ) -> Result<SessionKey, DuelError> {
        if challenger.id == challenged.id {
            return Err(DuelError::InvalidTarget(TargetIssue::SelfChallenge));
        }
        if !challenged.is_playable() || !challenger.is_playable() {
            return Err(DuelError::InvalidTarget(TargetIssue::NotPlayable));
        }
        if self.registry.contains(&SessionKey::new(server, challenger.id, challenged.id)) {
            return Err(DuelError::AlreadyActive);
        }
        for player in [challenger.id, challenged.id] {
            if self.decks.full_slots(server, player)?.is_empty() {
                return Err(DuelError::NoFullDeck(player));
            }
        }

        let rng = self.rng.fork();
        let now = self.now;
        let (challenger_id, challenged_id) = (challenger.id, challenged.id);
        let session = self.registry.create(server, challenger_id, challenged_id, |key| {
            DuelSession::new(key, challenger, challenged, channel, rng, now)
        })?;

        let mut ctx = SessionCtx {
            catalog: &self.catalog,
            decks: &self.decks,
            config: &self.config,
            now: self.now,
            outbox: &mut self.outbox,
        };
        session.propose(&mut ctx);

        let key = session.key();
        info!(%server, challenger = %challenger_id, challenged = %challenged_id, "challenge issued");
        Ok(key)
    }

    // === Events ===

    /// Queue an event in a session's inbox without processing it.
    pub fn post(&mut self, key: SessionKey, event: DuelEvent) -> Result<(), DuelError> {
        match self.registry.get_by_key_mut(&key) {
            Some(session) => {
                session.post(event);
                Ok(())
            }
            None => {
                if let Some(to) = event.actor() {
                    self.outbox.push(Outbound::Notice {
                        to,
                        text: DuelError::UnknownSession.to_string(),
                    });
                }
                Err(DuelError::UnknownSession)
            }
        }
    }

    /// Drain a session's inbox in order. Returns one result per event.
    pub fn process(&mut self, key: SessionKey) -> Vec<Result<(), DuelError>> {
        let Some(session) = self.registry.get_by_key_mut(&key) else {
            return Vec::new();
        };
        let mut ctx = SessionCtx {
            catalog: &self.catalog,
            decks: &self.decks,
            config: &self.config,
            now: self.now,
            outbox: &mut self.outbox,
        };

        let mut results = Vec::new();
        while let Some(event) = session.next_event() {
            results.push(session.handle(event, &mut ctx));
        }

        if session.is_terminal() {
            self.registry.remove(&key);
            debug!(%key, "session removed");
        }
        results
    }

    /// Post one event and process the inbox.
    ///
    /// Returns the result of handling this event.
    pub fn dispatch(&mut self, key: SessionKey, event: DuelEvent) -> Result<(), DuelError> {
        self.post(key, event)?;
        self.process(key).pop().unwrap_or(Ok(()))
    }

    /// The challenged player accepts or declines.
    pub fn answer(&mut self, key: SessionKey, actor: PlayerId, accept: bool) -> Result<(), DuelError> {
        self.dispatch(key, DuelEvent::Answer { actor, accept })
    }

    /// A player picks a deck slot.
    pub fn choose_deck(&mut self, key: SessionKey, actor: PlayerId, slot: DeckSlot) -> Result<(), DuelError> {
        self.dispatch(key, DuelEvent::ChooseDeck { actor, slot })
    }

    /// A player reveals the card at a deck index.
    pub fn reveal(&mut self, key: SessionKey, actor: PlayerId, index: usize) -> Result<(), DuelError> {
        self.dispatch(key, DuelEvent::Reveal { actor, index })
    }

    // === Clock ===

    /// Move the clock forward and fire every timer now due.
    ///
    /// All timers of one session due by `now` are delivered as a single
    /// event, so simultaneous misses are judged together. Returns the
    /// sessions that a timeout ended.
    pub fn advance_to(&mut self, now: Tick) -> Vec<SessionKey> {
        if now < self.now {
            warn!(current = %self.now, requested = %now, "clock cannot move backwards");
            return Vec::new();
        }
        self.now = now;

        let mut timed_out = Vec::new();
        for key in self.registry.keys() {
            let fired = self
                .registry
                .get_by_key_mut(&key)
                .map_or(false, |s| s.collect_timeouts(now));
            if !fired {
                continue;
            }
            if self.process(key).contains(&Err(DuelError::Timeout)) {
                timed_out.push(key);
            }
        }
        timed_out
    }

    /// Which side a player is on in a session.
    #[must_use]
    pub fn side_of(&self, key: &SessionKey, player: PlayerId) -> Option<Side> {
        self.session(key).and_then(|s| s.side_of(player))
    }
}

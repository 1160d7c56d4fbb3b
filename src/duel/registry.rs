//! Registry of active duels.
//!
//! At most one duel may be active per unordered pair of players within a
//! server. Keys sort the two player ids, so a challenge and its mirror
//! resolve to the same entry.
//!
//! `create` is a single check-and-insert through the map's entry API. The
//! registry is only reachable through `&mut`, so two challenges for the
//! same pair can never both succeed; a multi-threaded host wraps the
//! owning engine in a mutex and keeps that guarantee.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;

use crate::core::{DuelError, PlayerId, ServerId};

/// Order-independent key for a pair of players on one server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub server: ServerId,
    low: PlayerId,
    high: PlayerId,
}

impl SessionKey {
    /// Build the key for two players, in either order.
    #[must_use]
    pub fn new(server: ServerId, a: PlayerId, b: PlayerId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self { server, low, high }
    }

    /// The two players, smaller id first.
    #[must_use]
    pub fn players(&self) -> (PlayerId, PlayerId) {
        (self.low, self.high)
    }

    /// Whether a player is part of this pair.
    #[must_use]
    pub fn involves(&self, player: PlayerId) -> bool {
        self.low == player || self.high == player
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.server, self.low.0, self.high.0)
    }
}

/// Active sessions keyed by server and player pair.
///
/// ## Example
///
/// ```
/// use duel_engine::core::{DuelError, PlayerId, ServerId};
/// use duel_engine::duel::SessionRegistry;
///
/// let mut registry: SessionRegistry<&str> = SessionRegistry::new();
/// let server = ServerId::new(1);
/// let (p1, p2) = (PlayerId::new(1), PlayerId::new(2));
///
/// registry.create(server, p1, p2, |_| "duel").unwrap();
///
/// // The mirror challenge hits the same entry.
/// assert_eq!(registry.create(server, p2, p1, |_| "again").unwrap_err(), DuelError::AlreadyActive);
/// assert_eq!(registry.get(server, p2, p1), Some(&"duel"));
/// ```
#[derive(Clone, Debug)]
pub struct SessionRegistry<S> {
    sessions: FxHashMap<SessionKey, S>,
}

impl<S> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self {
            sessions: FxHashMap::default(),
        }
    }
}

impl<S> SessionRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for the pair, failing if one is active.
    ///
    /// `init` only runs when the slot is free.
    pub fn create(
        &mut self,
        server: ServerId,
        a: PlayerId,
        b: PlayerId,
        init: impl FnOnce(SessionKey) -> S,
    ) -> Result<&mut S, DuelError> {
        let key = SessionKey::new(server, a, b);
        match self.sessions.entry(key) {
            Entry::Occupied(_) => Err(DuelError::AlreadyActive),
            Entry::Vacant(slot) => Ok(slot.insert(init(key))),
        }
    }

    /// Look up the session for a pair, in either order.
    #[must_use]
    pub fn get(&self, server: ServerId, a: PlayerId, b: PlayerId) -> Option<&S> {
        self.sessions.get(&SessionKey::new(server, a, b))
    }

    /// Look up a session by key.
    #[must_use]
    pub fn get_by_key(&self, key: &SessionKey) -> Option<&S> {
        self.sessions.get(key)
    }

    /// Mutable lookup by key.
    pub fn get_by_key_mut(&mut self, key: &SessionKey) -> Option<&mut S> {
        self.sessions.get_mut(key)
    }

    /// Whether a pair has an active session.
    #[must_use]
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Remove a session. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &SessionKey) -> Option<S> {
        self.sessions.remove(key)
    }

    /// Keys of every active session, sorted for deterministic iteration.
    #[must_use]
    pub fn keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<_> = self.sessions.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: ServerId = ServerId::new(9);

    #[test]
    fn test_key_is_order_independent() {
        let k1 = SessionKey::new(SERVER, PlayerId::new(5), PlayerId::new(2));
        let k2 = SessionKey::new(SERVER, PlayerId::new(2), PlayerId::new(5));

        assert_eq!(k1, k2);
        assert_eq!(k1.players(), (PlayerId::new(2), PlayerId::new(5)));
        assert!(k1.involves(PlayerId::new(5)));
        assert!(!k1.involves(PlayerId::new(3)));
    }

    #[test]
    fn test_key_is_server_scoped() {
        let k1 = SessionKey::new(ServerId::new(1), PlayerId::new(1), PlayerId::new(2));
        let k2 = SessionKey::new(ServerId::new(2), PlayerId::new(1), PlayerId::new(2));
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let mut registry = SessionRegistry::new();
        let (a, b) = (PlayerId::new(1), PlayerId::new(2));

        registry.create(SERVER, a, b, |_| 1).unwrap();
        assert_eq!(registry.create(SERVER, a, b, |_| 2), Err(DuelError::AlreadyActive));
        assert_eq!(registry.create(SERVER, b, a, |_| 3), Err(DuelError::AlreadyActive));
        assert_eq!(registry.get(SERVER, a, b), Some(&1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_init_not_run_when_occupied() {
        let mut registry = SessionRegistry::new();
        let (a, b) = (PlayerId::new(1), PlayerId::new(2));
        registry.create(SERVER, a, b, |_| 1).unwrap();

        let mut ran = false;
        let _ = registry.create(SERVER, b, a, |_| {
            ran = true;
            2
        });
        assert!(!ran);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = SessionRegistry::new();
        let (a, b) = (PlayerId::new(1), PlayerId::new(2));
        registry.create(SERVER, a, b, |_| "x").unwrap();

        let key = SessionKey::new(SERVER, b, a);
        assert_eq!(registry.remove(&key), Some("x"));
        assert_eq!(registry.remove(&key), None);
        assert!(registry.is_empty());

        // The pair can duel again once removed.
        assert!(registry.create(SERVER, a, b, |_| "y").is_ok());
    }

    #[test]
    fn test_keys_sorted() {
        let mut registry = SessionRegistry::new();
        registry.create(SERVER, PlayerId::new(7), PlayerId::new(8), |_| ()).unwrap();
        registry.create(SERVER, PlayerId::new(1), PlayerId::new(2), |_| ()).unwrap();

        let keys = registry.keys();
        assert_eq!(keys[0].players(), (PlayerId::new(1), PlayerId::new(2)));
        assert_eq!(keys[1].players(), (PlayerId::new(7), PlayerId::new(8)));
    }
}

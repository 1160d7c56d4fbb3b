//! Duel configuration and logical time.
//!
//! Hosts configure the engine at startup with a `DuelConfig`. Every value
//! has a default matching the standard ruleset:
//! - 120 time units to answer any prompt
//! - first to 3 round wins, best of 5
//! - 1/2/3/4 compared stats with probability 0.60/0.25/0.10/0.05

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical time, in abstract time units.
///
/// The engine never reads a wall clock. Hosts advance time explicitly,
/// which keeps timeouts deterministic and testable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick(pub u64);

impl Tick {
    /// Create a new tick.
    #[must_use]
    pub const fn new(t: u64) -> Self {
        Self(t)
    }

    /// This tick moved forward by `units`.
    #[must_use]
    pub const fn after(self, units: u64) -> Self {
        Self(self.0.saturating_add(units))
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// Errors from `DuelConfig::validate`.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("stat-count weight #{0} is negative or not finite")]
    BadWeight(usize),
    #[error("stat-count weights sum to zero")]
    ZeroWeights,
    #[error("win score must be at least 1")]
    ZeroWinScore,
}

/// Complete duel configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DuelConfig {
    /// Time the challenged player has to accept or decline.
    pub challenge_timeout: u64,

    /// Time each player has to pick a deck, tracked per player.
    pub deck_timeout: u64,

    /// Time each player has to reveal a card in a round.
    pub reveal_timeout: u64,

    /// Round wins needed to take the duel outright.
    pub win_score: u32,

    /// Rounds after which any score lead decides the duel.
    pub regular_rounds: u32,

    /// Hard cap on rounds. `None` keeps extending while scores are tied.
    pub round_cap: Option<u32>,

    /// Relative weights for comparing 1, 2, 3 or 4 stats in a round.
    pub stat_count_weights: [f64; 4],
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            challenge_timeout: 120,
            deck_timeout: 120,
            reveal_timeout: 120,
            win_score: 3,
            regular_rounds: 5,
            round_cap: None,
            stat_count_weights: [0.60, 0.25, 0.10, 0.05],
        }
    }
}

impl DuelConfig {
    /// Create the standard configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same timeout for every prompt.
    #[must_use]
    pub fn with_timeouts(mut self, units: u64) -> Self {
        self.challenge_timeout = units;
        self.deck_timeout = units;
        self.reveal_timeout = units;
        self
    }

    /// Set the challenge acceptance timeout.
    #[must_use]
    pub fn with_challenge_timeout(mut self, units: u64) -> Self {
        self.challenge_timeout = units;
        self
    }

    /// Set the per-player deck selection timeout.
    #[must_use]
    pub fn with_deck_timeout(mut self, units: u64) -> Self {
        self.deck_timeout = units;
        self
    }

    /// Set the per-player card reveal timeout.
    #[must_use]
    pub fn with_reveal_timeout(mut self, units: u64) -> Self {
        self.reveal_timeout = units;
        self
    }

    /// Cap the total number of rounds. Past the cap the leader wins and a
    /// tie is a draw.
    #[must_use]
    pub fn with_round_cap(mut self, rounds: u32) -> Self {
        self.round_cap = Some(rounds);
        self
    }

    /// Set the stat-count weights.
    #[must_use]
    pub fn with_stat_count_weights(mut self, weights: [f64; 4]) -> Self {
        self.stat_count_weights = weights;
        self
    }

    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        if let Some(i) = self
            .stat_count_weights
            .iter()
            .position(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(ConfigIssue::BadWeight(i));
        }
        if self.stat_count_weights.iter().sum::<f64>() <= 0.0 {
            return Err(ConfigIssue::ZeroWeights);
        }
        if self.win_score == 0 {
            return Err(ConfigIssue::ZeroWinScore);
        }
        Ok(())
    }
}

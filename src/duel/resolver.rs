//! Round resolution: stat draw and card comparison.
//!
//! ## Stat draw
//!
//! Each round compares 1 to 4 stats. The count is sampled from a fixed
//! discrete distribution (by default 1: 0.60, 2: 0.25, 3: 0.10,
//! 4: 0.05) using cumulative thresholds over a uniform [0, 1) draw. That
//! many distinct stats are then drawn without replacement.
//!
//! ## Resolution
//!
//! `resolve` is pure: each side's drawn stats are summed and the strictly
//! greater total wins the round. Equal totals are a tie.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Card, Stat};
use crate::core::{DuelRng, Side, SideMap};

/// Stats compared in one round. Never more than four, never repeated.
pub type StatSet = SmallVec<[Stat; 4]>;

/// Map a uniform sample in [0, 1) to a stat count in 1..=4.
///
/// Weights are normalized, so they need not sum to one.
#[must_use]
pub fn sample_stat_count(u: f64, weights: &[f64; 4]) -> usize {
    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w / total;
        if u < cumulative {
            return i + 1;
        }
    }
    // Rounding left `u` above the last threshold.
    weights.iter().rposition(|&w| w > 0.0).map_or(1, |i| i + 1)
}

/// Draw the stats for a new round.
pub fn draw_stats(rng: &mut DuelRng, weights: &[f64; 4]) -> StatSet {
    let count = sample_stat_count(rng.gen_unit(), weights);
    rng.choose_distinct(&Stat::ALL, count).into_iter().collect()
}

/// One compared stat with both sides' values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub stat: Stat,
    pub values: SideMap<i64>,
}

/// Structured outcome of one resolved round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Round number this result belongs to.
    pub round: u32,

    /// Revealed cards.
    pub cards: SideMap<Card>,

    /// Per-stat values, in draw order.
    pub lines: SmallVec<[StatLine; 4]>,

    /// Summed totals over the drawn stats.
    pub totals: SideMap<i64>,

    /// Round winner; `None` for a tie.
    pub winner: Option<Side>,
}

impl RoundResult {
    /// The same round seen with sides swapped.
    #[must_use]
    pub fn mirrored(self) -> Self {
        Self {
            round: self.round,
            cards: self.cards.mirrored(),
            lines: self
                .lines
                .into_iter()
                .map(|l| StatLine {
                    stat: l.stat,
                    values: l.values.mirrored(),
                })
                .collect(),
            totals: self.totals.mirrored(),
            winner: self.winner.map(Side::other),
        }
    }
}

/// Compare two revealed cards over the drawn stats.
#[must_use]
pub fn resolve(round: u32, card_a: &Card, card_b: &Card, stats: &[Stat]) -> RoundResult {
    let lines: SmallVec<[StatLine; 4]> = stats
        .iter()
        .map(|&stat| StatLine {
            stat,
            values: SideMap::from_pair(card_a.stat(stat), card_b.stat(stat)),
        })
        .collect();

    let totals = SideMap::from_pair(card_a.total(stats), card_b.total(stats));

    let winner = match totals[Side::A].cmp(&totals[Side::B]) {
        std::cmp::Ordering::Greater => Some(Side::A),
        std::cmp::Ordering::Less => Some(Side::B),
        std::cmp::Ordering::Equal => None,
    };

    RoundResult {
        round,
        cards: SideMap::from_pair(card_a.clone(), card_b.clone()),
        lines,
        totals,
        winner,
    }
}

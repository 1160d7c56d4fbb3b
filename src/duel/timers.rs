//! Per-player timeout supervision.
//!
//! Every "waiting for player X" state has its own deadline. Deadlines are
//! tracked per side, not per phase, so one slow player never restarts the
//! other player's clock. A side has at most one outstanding wait.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{Side, SideMap, Tick};

/// What a side is being waited on for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerKind {
    /// Accept or decline a challenge.
    Challenge,
    /// Pick a deck slot.
    DeckChoice,
    /// Reveal a card for the current round.
    Reveal,
}

/// An armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub kind: TimerKind,
    pub due: Tick,
}

/// A timer that ran out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expired {
    pub side: Side,
    pub kind: TimerKind,
}

/// Independent deadlines for both sides of a duel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimers {
    slots: SideMap<Option<Deadline>>,
}

impl PhaseTimers {
    /// Create with nothing armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) a side's timer.
    pub fn arm(&mut self, side: Side, kind: TimerKind, due: Tick) {
        self.slots[side] = Some(Deadline { kind, due });
    }

    /// Disarm a side's timer. Returns the deadline that was armed.
    pub fn cancel(&mut self, side: Side) -> Option<Deadline> {
        self.slots[side].take()
    }

    /// Disarm everything.
    pub fn cancel_all(&mut self) {
        for (_, slot) in self.slots.iter_mut() {
            *slot = None;
        }
    }

    /// The armed deadline for a side, if any.
    #[must_use]
    pub fn armed(&self, side: Side) -> Option<Deadline> {
        self.slots[side]
    }

    /// Earliest armed deadline.
    #[must_use]
    pub fn next_due(&self) -> Option<Tick> {
        self.slots.iter().filter_map(|(_, d)| d.map(|d| d.due)).min()
    }

    /// Disarm and return every timer due at or before `now`.
    ///
    /// All expirations observed by one call are reported together so the
    /// caller can treat them as simultaneous.
    pub fn take_expired(&mut self, now: Tick) -> SmallVec<[Expired; 2]> {
        let mut expired = SmallVec::new();
        for (side, slot) in self.slots.iter_mut() {
            if let Some(deadline) = *slot {
                if deadline.due <= now {
                    expired.push(Expired { side, kind: deadline.kind });
                    *slot = None;
                }
            }
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_expire() {
        let mut timers = PhaseTimers::new();
        timers.arm(Side::A, TimerKind::Reveal, Tick::new(120));

        assert!(timers.take_expired(Tick::new(119)).is_empty());

        let expired = timers.take_expired(Tick::new(120));
        assert_eq!(expired.as_slice(), &[Expired { side: Side::A, kind: TimerKind::Reveal }]);

        // Expired timers are disarmed.
        assert!(timers.take_expired(Tick::new(500)).is_empty());
    }

    #[test]
    fn test_sides_are_independent() {
        let mut timers = PhaseTimers::new();
        timers.arm(Side::A, TimerKind::DeckChoice, Tick::new(120));
        timers.arm(Side::B, TimerKind::DeckChoice, Tick::new(150));

        timers.cancel(Side::A);
        assert_eq!(timers.armed(Side::A), None);
        assert_eq!(timers.next_due(), Some(Tick::new(150)));

        let expired = timers.take_expired(Tick::new(150));
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].side, Side::B);
    }

    #[test]
    fn test_simultaneous_expiry() {
        let mut timers = PhaseTimers::new();
        timers.arm(Side::A, TimerKind::Reveal, Tick::new(100));
        timers.arm(Side::B, TimerKind::Reveal, Tick::new(110));

        let expired = timers.take_expired(Tick::new(200));
        assert_eq!(expired.len(), 2);
        assert_eq!(timers.next_due(), None);
    }

    #[test]
    fn test_cancel_all() {
        let mut timers = PhaseTimers::new();
        timers.arm(Side::A, TimerKind::Reveal, Tick::new(1));
        timers.arm(Side::B, TimerKind::Reveal, Tick::new(1));
        timers.cancel_all();

        assert!(timers.take_expired(Tick::new(10)).is_empty());
    }
}

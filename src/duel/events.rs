//! Messages into and out of a duel session.
//!
//! ## Inbound
//!
//! Platform callbacks (button presses, menu picks) and timer expirations
//! become `DuelEvent`s posted to the owning session's inbox. The session
//! state machine is the only thing that mutates session state.
//!
//! ## Outbound
//!
//! The engine emits `Outbound` messages: prompts restricted to one player,
//! notices for rejected input, and narration for the shared channel. Every
//! terminal outcome produces exactly one `Finished` or `Cancelled`
//! announcement.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::resolver::{RoundResult, StatSet};
use super::session::{CancelReason, DrawReason, DuelOutcome, WinReason};
use super::timers::Expired;
use crate::cards::CardId;
use crate::core::{ChannelId, PlayerId, Side, SideMap};
use crate::decks::DeckSlot;

/// Input to a duel session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelEvent {
    /// The challenged player accepts or declines.
    Answer { actor: PlayerId, accept: bool },

    /// A player picks one of the deck slots they were offered.
    ChooseDeck { actor: PlayerId, slot: DeckSlot },

    /// A player reveals the card at a deck index for the current round.
    Reveal { actor: PlayerId, index: usize },

    /// Timers that ran out during one clock advance.
    TimersExpired(SmallVec<[Expired; 2]>),
}

impl DuelEvent {
    /// The player who sent this event, if it came from a player.
    #[must_use]
    pub fn actor(&self) -> Option<PlayerId> {
        match self {
            DuelEvent::Answer { actor, .. }
            | DuelEvent::ChooseDeck { actor, .. }
            | DuelEvent::Reveal { actor, .. } => Some(*actor),
            DuelEvent::TimersExpired(_) => None,
        }
    }
}

/// One selectable card in a reveal prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOption {
    /// Deck index to send back in `DuelEvent::Reveal`.
    pub index: usize,
    pub card: CardId,
    pub name: String,
}

/// Narration for the shared channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Announcement {
    Challenged {
        challenger: String,
        challenged: String,
    },
    Accepted {
        names: SideMap<String>,
    },
    DecksLocked {
        names: SideMap<String>,
        slots: SideMap<DeckSlot>,
    },
    RoundStarted {
        round: u32,
        stats: StatSet,
    },
    RoundResolved {
        names: SideMap<String>,
        result: RoundResult,
        score: SideMap<u32>,
    },
    Finished {
        names: SideMap<String>,
        outcome: DuelOutcome,
        score: SideMap<u32>,
    },
    Cancelled {
        names: SideMap<String>,
        reason: CancelReason,
    },
}

impl Announcement {
    /// Whether this is the single closing message of a duel.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Announcement::Finished { .. } | Announcement::Cancelled { .. })
    }
}

fn join_stats(stats: &StatSet) -> String {
    stats.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" + ")
}

impl std::fmt::Display for Announcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Announcement::Challenged { challenger, challenged } => {
                write!(f, "{} has challenged {} to a duel!", challenger, challenged)
            }
            Announcement::Accepted { names } => write!(
                f,
                "{} accepted the duel against {}. Both players, choose your deck.",
                names[Side::B],
                names[Side::A]
            ),
            Announcement::DecksLocked { names, slots } => write!(
                f,
                "{} plays deck {}, {} plays deck {}. Let the duel begin!",
                names[Side::A],
                slots[Side::A],
                names[Side::B],
                slots[Side::B]
            ),
            Announcement::RoundStarted { round, stats } => {
                write!(f, "Round {}: comparing {}.", round, join_stats(stats))
            }
            Announcement::RoundResolved { names, result, score } => {
                write!(
                    f,
                    "Round {}: {} ({}) vs {} ({}).",
                    result.round,
                    result.cards[Side::A].name,
                    result.totals[Side::A],
                    result.cards[Side::B].name,
                    result.totals[Side::B]
                )?;
                for line in &result.lines {
                    write!(
                        f,
                        " {} {}-{};",
                        line.stat,
                        line.values[Side::A],
                        line.values[Side::B]
                    )?;
                }
                match result.winner {
                    Some(side) => write!(f, " {} wins the round.", names[side])?,
                    None => write!(f, " The round is a tie.")?,
                }
                write!(f, " Score {}-{}.", score[Side::A], score[Side::B])
            }
            Announcement::Finished { names, outcome, score } => match outcome {
                DuelOutcome::Won { winner, reason } => {
                    let loser = names[winner.other()].as_str();
                    match reason {
                        WinReason::ReachedWinScore | WinReason::ScoreLead => write!(
                            f,
                            "{} wins the duel {}-{}!",
                            names[*winner],
                            score[*winner],
                            score[winner.other()]
                        ),
                        WinReason::Abandonment => write!(
                            f,
                            "{} did not play a card in time. {} wins the duel!",
                            loser, names[*winner]
                        ),
                    }
                }
                DuelOutcome::Draw(reason) => match reason {
                    DrawReason::BothAbandoned => {
                        f.write_str("Neither player played a card in time. The duel is a draw.")
                    }
                    DrawReason::DecksExhausted => write!(
                        f,
                        "Both decks are spent. The duel ends in a draw {}-{}.",
                        score[Side::A],
                        score[Side::B]
                    ),
                    DrawReason::RoundCap => write!(
                        f,
                        "The round limit was reached. The duel ends in a draw {}-{}.",
                        score[Side::A],
                        score[Side::B]
                    ),
                },
            },
            Announcement::Cancelled { names, reason } => {
                f.write_str("Duel cancelled: ")?;
                match reason {
                    CancelReason::Declined => write!(f, "{} declined the challenge.", names[Side::B]),
                    CancelReason::NoAnswer => {
                        write!(f, "{} did not answer the challenge.", names[Side::B])
                    }
                    CancelReason::NoResponse(side) => {
                        write!(f, "{} did not respond in time.", names[*side])
                    }
                    CancelReason::NeitherResponded => f.write_str("neither player responded in time."),
                    CancelReason::NoFullDeck(side) => {
                        write!(f, "{} no longer has a full deck.", names[*side])
                    }
                    CancelReason::DeckInvalidated { side, slot } => {
                        write!(f, "deck {} of {} is no longer full.", slot, names[*side])
                    }
                    CancelReason::StorageUnavailable => {
                        f.write_str("card data is unavailable right now, please try again later.")
                    }
                }
            }
        }
    }
}

/// Message emitted by the engine for the host to deliver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outbound {
    /// Accept/decline prompt, answerable only by `to`.
    ChallengePrompt {
        to: PlayerId,
        challenger: String,
    },

    /// Deck choice prompt listing the recipient's full deck slots.
    DeckPrompt {
        to: PlayerId,
        slots: Vec<DeckSlot>,
    },

    /// Card choice prompt listing only unused deck indices.
    CardPrompt {
        to: PlayerId,
        round: u32,
        stats: StatSet,
        options: Vec<CardOption>,
    },

    /// Private notice, e.g. for input from the wrong player.
    Notice {
        to: PlayerId,
        text: String,
    },

    /// Narration for the shared channel.
    Public {
        channel: ChannelId,
        announcement: Announcement,
    },
}

impl Outbound {
    /// The recipient of a restricted message.
    #[must_use]
    pub fn recipient(&self) -> Option<PlayerId> {
        match self {
            Outbound::ChallengePrompt { to, .. }
            | Outbound::DeckPrompt { to, .. }
            | Outbound::CardPrompt { to, .. }
            | Outbound::Notice { to, .. } => Some(*to),
            Outbound::Public { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Rarity, Stat};
    use crate::duel::resolver::resolve;

    fn names() -> SideMap<String> {
        SideMap::from_pair("Kiryu".to_string(), "Majima".to_string())
    }

    #[test]
    fn test_event_actor() {
        let ev = DuelEvent::Reveal { actor: PlayerId::new(3), index: 0 };
        assert_eq!(ev.actor(), Some(PlayerId::new(3)));
        assert_eq!(DuelEvent::TimersExpired(SmallVec::new()).actor(), None);
    }

    #[test]
    fn test_round_narration() {
        let a = Card::new(CardId::new(1), "Dragon", Rarity::UR).with_stats(0, 200, 0, 0);
        let b = Card::new(CardId::new(2), "Snake", Rarity::SR).with_stats(0, 150, 0, 0);
        let result = resolve(1, &a, &b, &[Stat::Attack]);

        let text = Announcement::RoundResolved {
            names: names(),
            result,
            score: SideMap::from_pair(1, 0),
        }
        .to_string();

        assert_eq!(
            text,
            "Round 1: Dragon (200) vs Snake (150). attack 200-150; Kiryu wins the round. Score 1-0."
        );
    }

    #[test]
    fn test_terminal_narration() {
        let won = Announcement::Finished {
            names: names(),
            outcome: DuelOutcome::Won { winner: Side::A, reason: WinReason::Abandonment },
            score: SideMap::from_pair(1, 1),
        };
        assert!(won.is_terminal());
        assert_eq!(won.to_string(), "Majima did not play a card in time. Kiryu wins the duel!");

        let cancelled = Announcement::Cancelled {
            names: names(),
            reason: CancelReason::Declined,
        };
        assert!(cancelled.is_terminal());
        assert_eq!(cancelled.to_string(), "Duel cancelled: Majima declined the challenge.");

        let started = Announcement::RoundStarted {
            round: 2,
            stats: [Stat::Health, Stat::Speed].into_iter().collect(),
        };
        assert!(!started.is_terminal());
        assert_eq!(started.to_string(), "Round 2: comparing health + speed.");
    }
}

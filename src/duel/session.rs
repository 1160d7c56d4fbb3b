//! Duel session state machine.
//!
//! ## Phases
//!
//! ```text
//! Proposed ──accept──▶ DeckSelection ──both decks──▶ Round ──▶ Finished
//!    │                      │                          │
//!    └─decline/timeout──────┴──timeout/invalid deck────┴──▶ Cancelled
//! ```
//!
//! Each round runs `StatDraw → AwaitingReveal → Resolved`. Reveals from
//! the two players may arrive in either order; resolution waits for both.
//!
//! All mutation goes through `DuelSession::handle`, one event at a time,
//! from the session's inbox. A session in `Finished` or `Cancelled` is
//! removed from the registry by the engine right after the event that
//! ended it.

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::{debug, error, info};

use super::events::{Announcement, CardOption, DuelEvent, Outbound};
use super::registry::SessionKey;
use super::resolver::{draw_stats, resolve, RoundResult, StatSet};
use super::timers::{Expired, PhaseTimers, TimerKind};
use crate::cards::{Card, CardCatalog, CardId, Stat};
use crate::core::{
    ChannelId, DuelConfig, DuelError, DuelRng, PlayerId, PlayerIdentity, Side, SideMap, Tick,
};
use crate::decks::{Deck, DeckSlot, DeckStore};

/// Why a duel was won.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinReason {
    /// The winner reached the configured win score.
    ReachedWinScore,
    /// Regular rounds ran out (or decks or the round cap did) with a lead.
    ScoreLead,
    /// The opponent missed a reveal deadline.
    Abandonment,
}

/// Why a duel was drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawReason {
    /// Both players missed the same reveal deadline check.
    BothAbandoned,
    /// No unused cards left with scores level.
    DecksExhausted,
    /// The configured round cap passed with scores level.
    RoundCap,
}

/// Result of a duel that was played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelOutcome {
    Won { winner: Side, reason: WinReason },
    Draw(DrawReason),
}

/// Why a duel stopped before or outside normal play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelReason {
    /// The challenged player declined.
    Declined,
    /// The challenged player never answered.
    NoAnswer,
    /// One player did not pick a deck in time.
    NoResponse(Side),
    /// Neither player picked a deck in time.
    NeitherResponded,
    /// A player had no full deck when deck selection began.
    NoFullDeck(Side),
    /// The picked deck was no longer full when the pick was applied.
    DeckInvalidated { side: Side, slot: DeckSlot },
    /// Deck store or card catalog failed.
    StorageUnavailable,
}

/// Steps within one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStage {
    StatDraw,
    AwaitingReveal,
    Resolved,
}

/// Where a duel is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelPhase {
    /// Waiting for the challenged player to answer.
    Proposed,
    /// Waiting for deck picks. `offered` is each side's full slots at entry.
    DeckSelection { offered: SideMap<SmallVec<[DeckSlot; 3]>> },
    /// Rounds in progress.
    Round(RoundStage),
    Finished(DuelOutcome),
    Cancelled(CancelReason),
}

impl DuelPhase {
    /// Whether the duel has ended one way or another.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, DuelPhase::Finished(_) | DuelPhase::Cancelled(_))
    }
}

/// A committed card choice waiting for the other player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub index: usize,
    pub card: CardId,
}

/// Collaborators and output sink for handling one event.
pub(crate) struct SessionCtx<'a> {
    pub catalog: &'a dyn CardCatalog,
    pub decks: &'a dyn DeckStore,
    pub config: &'a DuelConfig,
    pub now: Tick,
    pub outbox: &'a mut Vec<Outbound>,
}

/// Decide whether a duel ends after a resolved round.
///
/// `round` is the counter after it was advanced past the resolved round.
#[must_use]
pub fn check_termination(score: &SideMap<u32>, round: u32, config: &DuelConfig) -> Option<DuelOutcome> {
    let leader = match score[Side::A].cmp(&score[Side::B]) {
        std::cmp::Ordering::Greater => Some(Side::A),
        std::cmp::Ordering::Less => Some(Side::B),
        std::cmp::Ordering::Equal => None,
    };

    if let Some(winner) = leader {
        if score[winner] >= config.win_score {
            return Some(DuelOutcome::Won { winner, reason: WinReason::ReachedWinScore });
        }
        if round > config.regular_rounds {
            return Some(DuelOutcome::Won { winner, reason: WinReason::ScoreLead });
        }
    }

    match config.round_cap {
        Some(cap) if round > cap => Some(match leader {
            Some(winner) => DuelOutcome::Won { winner, reason: WinReason::ScoreLead },
            None => DuelOutcome::Draw(DrawReason::RoundCap),
        }),
        _ => None,
    }
}

/// All mutable state of one duel.
#[derive(Clone, Debug)]
pub struct DuelSession {
    key: SessionKey,
    players: SideMap<PlayerIdentity>,
    channel: ChannelId,
    phase: DuelPhase,
    score: SideMap<u32>,
    round: u32,
    current_stats: StatSet,
    deck_slots: SideMap<Option<DeckSlot>>,
    decks: SideMap<Option<Deck>>,
    used: SideMap<OrdSet<usize>>,
    pending: SideMap<Option<Reveal>>,
    abandoned_by: SmallVec<[Side; 2]>,
    history: Vector<RoundResult>,
    timers: PhaseTimers,
    inbox: VecDeque<DuelEvent>,
    rng: DuelRng,
    created_at: Tick,
}

impl DuelSession {
    /// Create a proposed duel. `challenger` plays side A.
    pub(crate) fn new(
        key: SessionKey,
        challenger: PlayerIdentity,
        challenged: PlayerIdentity,
        channel: ChannelId,
        rng: DuelRng,
        now: Tick,
    ) -> Self {
        Self {
            key,
            players: SideMap::from_pair(challenger, challenged),
            channel,
            phase: DuelPhase::Proposed,
            score: SideMap::with_value(0),
            round: 1,
            current_stats: StatSet::new(),
            deck_slots: SideMap::with_value(None),
            decks: SideMap::with_value(None),
            used: SideMap::with_value(OrdSet::new()),
            pending: SideMap::with_value(None),
            abandoned_by: SmallVec::new(),
            history: Vector::new(),
            timers: PhaseTimers::new(),
            inbox: VecDeque::new(),
            rng,
            created_at: now,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn key(&self) -> SessionKey {
        self.key
    }

    #[must_use]
    pub fn player(&self, side: Side) -> &PlayerIdentity {
        &self.players[side]
    }

    /// Which side a player is on, if they are in this duel.
    #[must_use]
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        Side::BOTH.into_iter().find(|&s| self.players[s].id == player)
    }

    #[must_use]
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    #[must_use]
    pub fn phase(&self) -> &DuelPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    #[must_use]
    pub fn score(&self) -> &SideMap<u32> {
        &self.score
    }

    /// Current round number, starting at 1.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Stats drawn for the active round.
    #[must_use]
    pub fn current_stats(&self) -> &[Stat] {
        &self.current_stats
    }

    /// Slot letter a side picked.
    #[must_use]
    pub fn deck_slot(&self, side: Side) -> Option<DeckSlot> {
        self.deck_slots[side]
    }

    /// Frozen deck snapshot a side plays with.
    #[must_use]
    pub fn deck(&self, side: Side) -> Option<&Deck> {
        self.decks[side].as_ref()
    }

    /// Deck indices a side has already revealed.
    #[must_use]
    pub fn used_indices(&self, side: Side) -> &OrdSet<usize> {
        &self.used[side]
    }

    /// Deck indices a side may still reveal.
    #[must_use]
    pub fn unused_indices(&self, side: Side) -> Vec<usize> {
        match &self.decks[side] {
            Some(deck) => (0..deck.len()).filter(|i| !self.used[side].contains(i)).collect(),
            None => Vec::new(),
        }
    }

    #[must_use]
    pub fn pending_reveal(&self, side: Side) -> Option<Reveal> {
        self.pending[side]
    }

    /// Sides that missed a reveal deadline.
    #[must_use]
    pub fn abandoned_by(&self) -> &[Side] {
        &self.abandoned_by
    }

    /// Every resolved round, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<RoundResult> {
        &self.history
    }

    #[must_use]
    pub fn timers(&self) -> &PhaseTimers {
        &self.timers
    }

    #[must_use]
    pub fn created_at(&self) -> Tick {
        self.created_at
    }

    /// Final outcome, once finished.
    #[must_use]
    pub fn outcome(&self) -> Option<DuelOutcome> {
        match self.phase {
            DuelPhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn names(&self) -> SideMap<String> {
        SideMap::new(|s| self.players[s].display_name.clone())
    }

    fn announce(&self, ctx: &mut SessionCtx<'_>, announcement: Announcement) {
        ctx.outbox.push(Outbound::Public {
            channel: self.channel,
            announcement,
        });
    }

    // === Inbox ===

    pub(crate) fn post(&mut self, event: DuelEvent) {
        self.inbox.push_back(event);
    }

    pub(crate) fn next_event(&mut self) -> Option<DuelEvent> {
        self.inbox.pop_front()
    }

    /// Collect due timers into the inbox. Returns true if any fired.
    pub(crate) fn collect_timeouts(&mut self, now: Tick) -> bool {
        let expired = self.timers.take_expired(now);
        if expired.is_empty() {
            return false;
        }
        self.inbox.push_back(DuelEvent::TimersExpired(expired));
        true
    }

    // === Phase entry ===

    /// Send the challenge prompt and start the answer timer.
    pub(crate) fn propose(&mut self, ctx: &mut SessionCtx<'_>) {
        let challenged = self.players[Side::B].id;
        self.timers.arm(
            Side::B,
            TimerKind::Challenge,
            ctx.now.after(ctx.config.challenge_timeout),
        );
        ctx.outbox.push(Outbound::ChallengePrompt {
            to: challenged,
            challenger: self.players[Side::A].display_name.clone(),
        });
        self.announce(
            ctx,
            Announcement::Challenged {
                challenger: self.players[Side::A].display_name.clone(),
                challenged: self.players[Side::B].display_name.clone(),
            },
        );
        info!(key = %self.key, "duel proposed");
    }

    // === Event handling ===

    /// Apply one event.
    ///
    /// Input errors leave the session untouched and send the sender a
    /// notice. Errors that end the duel are narrated to the channel and
    /// also returned.
    pub(crate) fn handle(&mut self, event: DuelEvent, ctx: &mut SessionCtx<'_>) -> Result<(), DuelError> {
        if self.is_terminal() {
            return self.reject(ctx, event.actor(), DuelError::UnexpectedInput);
        }
        match event {
            DuelEvent::Answer { actor, accept } => self.on_answer(ctx, actor, accept),
            DuelEvent::ChooseDeck { actor, slot } => self.on_deck_choice(ctx, actor, slot),
            DuelEvent::Reveal { actor, index } => self.on_reveal(ctx, actor, index),
            DuelEvent::TimersExpired(expired) => self.on_timeout(ctx, &expired),
        }
    }

    fn reject(
        &self,
        ctx: &mut SessionCtx<'_>,
        actor: Option<PlayerId>,
        err: DuelError,
    ) -> Result<(), DuelError> {
        debug!(key = %self.key, ?actor, %err, "input rejected");
        if let Some(to) = actor {
            ctx.outbox.push(Outbound::Notice { to, text: err.to_string() });
        }
        Err(err)
    }

    fn on_answer(&mut self, ctx: &mut SessionCtx<'_>, actor: PlayerId, accept: bool) -> Result<(), DuelError> {
        if self.side_of(actor) != Some(Side::B) {
            return self.reject(ctx, Some(actor), DuelError::NotYourPrompt);
        }
        if self.phase != DuelPhase::Proposed {
            return self.reject(ctx, Some(actor), DuelError::UnexpectedInput);
        }

        self.timers.cancel(Side::B);
        if accept {
            self.enter_deck_selection(ctx)
        } else {
            self.cancel(ctx, CancelReason::Declined);
            Ok(())
        }
    }

    fn enter_deck_selection(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), DuelError> {
        let mut offered: SideMap<SmallVec<[DeckSlot; 3]>> = SideMap::default();
        for side in Side::BOTH {
            let slots = match ctx.decks.full_slots(self.key.server, self.players[side].id) {
                Ok(slots) => slots,
                Err(err) => return Err(self.abort_storage(ctx, err.into())),
            };
            if slots.is_empty() {
                self.cancel(ctx, CancelReason::NoFullDeck(side));
                return Err(DuelError::NoFullDeck(self.players[side].id));
            }
            offered[side] = slots.into_iter().collect();
        }

        let due = ctx.now.after(ctx.config.deck_timeout);
        for side in Side::BOTH {
            self.timers.arm(side, TimerKind::DeckChoice, due);
            ctx.outbox.push(Outbound::DeckPrompt {
                to: self.players[side].id,
                slots: offered[side].to_vec(),
            });
        }
        self.phase = DuelPhase::DeckSelection { offered };
        self.announce(ctx, Announcement::Accepted { names: self.names() });
        info!(key = %self.key, "duel accepted, selecting decks");
        Ok(())
    }

    fn on_deck_choice(&mut self, ctx: &mut SessionCtx<'_>, actor: PlayerId, slot: DeckSlot) -> Result<(), DuelError> {
        let Some(side) = self.side_of(actor) else {
            return self.reject(ctx, Some(actor), DuelError::NotYourPrompt);
        };
        let was_offered = match &self.phase {
            DuelPhase::DeckSelection { offered } => offered[side].contains(&slot),
            _ => return self.reject(ctx, Some(actor), DuelError::UnexpectedInput),
        };
        if self.decks[side].is_some() {
            return self.reject(ctx, Some(actor), DuelError::UnexpectedInput);
        }
        if !was_offered {
            return self.reject(ctx, Some(actor), DuelError::DeckNotOffered(slot));
        }

        // Re-read: the deck may have changed since it was offered.
        let deck = match ctx.decks.load(self.key.server, actor, slot) {
            Ok(deck) => deck,
            Err(err) => return Err(self.abort_storage(ctx, err.into())),
        };
        if !deck.is_full() {
            self.cancel(ctx, CancelReason::DeckInvalidated { side, slot });
            return Err(DuelError::DeckInvalidatedMidSelection { player: actor, slot });
        }

        self.timers.cancel(side);
        self.decks[side] = Some(deck);
        self.deck_slots[side] = Some(slot);
        debug!(key = %self.key, ?side, %slot, "deck locked");

        if let (Some(a), Some(b)) = (self.deck_slots[Side::A], self.deck_slots[Side::B]) {
            self.announce(
                ctx,
                Announcement::DecksLocked {
                    names: self.names(),
                    slots: SideMap::from_pair(a, b),
                },
            );
            self.begin_round(ctx);
        }
        Ok(())
    }

    fn begin_round(&mut self, ctx: &mut SessionCtx<'_>) {
        if Side::BOTH.iter().any(|&s| self.unused_indices(s).is_empty()) {
            let outcome = match self.score[Side::A].cmp(&self.score[Side::B]) {
                std::cmp::Ordering::Greater => DuelOutcome::Won { winner: Side::A, reason: WinReason::ScoreLead },
                std::cmp::Ordering::Less => DuelOutcome::Won { winner: Side::B, reason: WinReason::ScoreLead },
                std::cmp::Ordering::Equal => DuelOutcome::Draw(DrawReason::DecksExhausted),
            };
            self.finish(ctx, outcome);
            return;
        }

        self.phase = DuelPhase::Round(RoundStage::StatDraw);
        self.current_stats = draw_stats(&mut self.rng, &ctx.config.stat_count_weights);
        self.announce(
            ctx,
            Announcement::RoundStarted {
                round: self.round,
                stats: self.current_stats.clone(),
            },
        );

        let due = ctx.now.after(ctx.config.reveal_timeout);
        for side in Side::BOTH {
            self.timers.arm(side, TimerKind::Reveal, due);
            let options = self.card_options(side, ctx.catalog);
            ctx.outbox.push(Outbound::CardPrompt {
                to: self.players[side].id,
                round: self.round,
                stats: self.current_stats.clone(),
                options,
            });
        }
        self.phase = DuelPhase::Round(RoundStage::AwaitingReveal);
        info!(key = %self.key, round = self.round, stats = ?self.current_stats, "round started");
    }

    fn card_options(&self, side: Side, catalog: &dyn CardCatalog) -> Vec<CardOption> {
        let Some(deck) = &self.decks[side] else {
            return Vec::new();
        };
        self.unused_indices(side)
            .into_iter()
            .filter_map(|index| {
                let card = deck.get(index)?;
                let name = catalog
                    .lookup(card)
                    .map_or_else(|| card.to_string(), |c| c.name);
                Some(CardOption { index, card, name })
            })
            .collect()
    }

    fn on_reveal(&mut self, ctx: &mut SessionCtx<'_>, actor: PlayerId, index: usize) -> Result<(), DuelError> {
        let Some(side) = self.side_of(actor) else {
            return self.reject(ctx, Some(actor), DuelError::NotYourPrompt);
        };
        if self.phase != DuelPhase::Round(RoundStage::AwaitingReveal) || self.pending[side].is_some() {
            return self.reject(ctx, Some(actor), DuelError::UnexpectedInput);
        }
        let card = match &self.decks[side] {
            Some(deck) if !self.used[side].contains(&index) => deck.get(index),
            _ => None,
        };
        let Some(card) = card else {
            return self.reject(ctx, Some(actor), DuelError::SlotUnavailable(index));
        };

        self.used[side].insert(index);
        self.pending[side] = Some(Reveal { index, card });
        self.timers.cancel(side);
        debug!(key = %self.key, ?side, index, %card, "card revealed");

        if self.pending[Side::A].is_some() && self.pending[Side::B].is_some() {
            self.resolve_round(ctx)
        } else {
            Ok(())
        }
    }

    fn resolve_round(&mut self, ctx: &mut SessionCtx<'_>) -> Result<(), DuelError> {
        let (Some(reveal_a), Some(reveal_b)) = (self.pending[Side::A].take(), self.pending[Side::B].take()) else {
            return Ok(());
        };
        let cards = match (lookup(ctx.catalog, reveal_a.card), lookup(ctx.catalog, reveal_b.card)) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(err), _) | (_, Err(err)) => return Err(self.abort_storage(ctx, err)),
        };

        let result = resolve(self.round, &cards.0, &cards.1, &self.current_stats);
        self.phase = DuelPhase::Round(RoundStage::Resolved);
        if let Some(winner) = result.winner {
            self.score[winner] += 1;
        }
        info!(
            key = %self.key,
            round = self.round,
            winner = ?result.winner,
            score_a = self.score[Side::A],
            score_b = self.score[Side::B],
            "round resolved"
        );
        self.history.push_back(result.clone());
        self.announce(
            ctx,
            Announcement::RoundResolved {
                names: self.names(),
                result,
                score: self.score,
            },
        );

        self.round += 1;
        match check_termination(&self.score, self.round, ctx.config) {
            Some(outcome) => self.finish(ctx, outcome),
            None => self.begin_round(ctx),
        }
        Ok(())
    }

    fn on_timeout(&mut self, ctx: &mut SessionCtx<'_>, expired: &[Expired]) -> Result<(), DuelError> {
        if expired.is_empty() {
            return Ok(());
        }
        match self.phase {
            DuelPhase::Proposed => {
                self.cancel(ctx, CancelReason::NoAnswer);
            }
            DuelPhase::DeckSelection { .. } => {
                let reason = if expired.len() == 2 {
                    CancelReason::NeitherResponded
                } else {
                    CancelReason::NoResponse(expired[0].side)
                };
                self.cancel(ctx, reason);
            }
            DuelPhase::Round(_) => {
                for e in expired.iter().filter(|e| e.kind == TimerKind::Reveal) {
                    if !self.abandoned_by.contains(&e.side) {
                        self.abandoned_by.push(e.side);
                    }
                }
                // Decided on the spot: a second missed deadline in a later
                // check can never turn a loss into a draw.
                let outcome = match self.abandoned_by.as_slice() {
                    [] => return Ok(()),
                    [side] => DuelOutcome::Won { winner: side.other(), reason: WinReason::Abandonment },
                    _ => DuelOutcome::Draw(DrawReason::BothAbandoned),
                };
                self.finish(ctx, outcome);
            }
            DuelPhase::Finished(_) | DuelPhase::Cancelled(_) => return Ok(()),
        }
        Err(DuelError::Timeout)
    }

    // === Terminal transitions ===

    fn finish(&mut self, ctx: &mut SessionCtx<'_>, outcome: DuelOutcome) {
        self.timers.cancel_all();
        self.pending = SideMap::with_value(None);
        self.phase = DuelPhase::Finished(outcome);
        info!(key = %self.key, ?outcome, rounds = self.history.len(), "duel finished");
        self.announce(
            ctx,
            Announcement::Finished {
                names: self.names(),
                outcome,
                score: self.score,
            },
        );
    }

    fn cancel(&mut self, ctx: &mut SessionCtx<'_>, reason: CancelReason) {
        self.timers.cancel_all();
        self.pending = SideMap::with_value(None);
        info!(key = %self.key, ?reason, "duel cancelled");
        self.phase = DuelPhase::Cancelled(reason.clone());
        self.announce(ctx, Announcement::Cancelled { names: self.names(), reason });
    }

    fn abort_storage(&mut self, ctx: &mut SessionCtx<'_>, err: DuelError) -> DuelError {
        error!(key = %self.key, %err, "storage failure, aborting duel");
        self.cancel(ctx, CancelReason::StorageUnavailable);
        err
    }
}

fn lookup(catalog: &dyn CardCatalog, id: CardId) -> Result<Card, DuelError> {
    catalog
        .lookup(id)
        .ok_or_else(|| DuelError::StorageUnavailable(format!("{} missing from catalog", id)))
}

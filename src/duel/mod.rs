//! Duel sessions: lifecycle, timers, round resolution and the engine.
//!
//! ## Key Types
//!
//! - `DuelEngine`: Owns every active session, the clock and the outbox
//! - `DuelSession`: One duel's state machine
//! - `SessionRegistry`: At most one duel per player pair per server
//! - `PhaseTimers`: Independent per-side deadlines
//! - `RoundResult`: Structured outcome of one round

pub mod registry;
pub mod timers;
pub mod resolver;
pub mod events;
pub mod session;
pub mod engine;

pub use registry::{SessionKey, SessionRegistry};
pub use timers::{Deadline, Expired, PhaseTimers, TimerKind};
pub use resolver::{draw_stats, resolve, sample_stat_count, RoundResult, StatLine, StatSet};
pub use events::{Announcement, CardOption, DuelEvent, Outbound};
pub use session::{
    check_termination, CancelReason, DrawReason, DuelOutcome, DuelPhase, DuelSession, Reveal, RoundStage,
    WinReason,
};
pub use engine::DuelEngine;

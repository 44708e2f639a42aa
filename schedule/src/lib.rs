//! Unlock-schedule math for Allocation/Token Positions (ATPs).
//!
//! The main thing this crate does is answer "how much of this lock has
//! unlocked at instant `t`", mirroring the on-chain linear-vesting
//! arithmetic bit for bit, and aggregate that answer over many locks.
//!
//! # Data model
//!
//! A [`Lock`] is a vesting schedule definition:
//! * `start_time`: absolute instant vesting begins
//! * `cliff_duration`: elapsed time from start until anything may unlock
//! * `lock_duration`: elapsed time from start until full unlock
//!   (measured from start, not from the cliff)
//! * `amount`: total quantity subject to the schedule, token base units
//!
//! From a `Lock` and an evaluation instant, [`unlock_schedule`] derives an
//! [`UnlockSchedule`]; [`unlock_series`] samples the aggregate curve over a
//! time range; [`unlock_stats`] tallies totals across a set of locks.
//!
//! Everything here is pure. No I/O, no clocks (the caller supplies the
//! evaluation instant, [`now_millis`] being the conventional default), and
//! no floating point anywhere near token amounts.

pub mod units; pub use units::*;
pub mod validate; pub use validate::*;
pub mod unlock; pub use unlock::*;
pub mod stats; pub use stats::*;

use serde::{Deserialize, Serialize};

/// A linear-with-cliff vesting schedule definition.
///
/// Immutable once constructed; derived values are recomputed, never written
/// back. Times are millisecond-denominated throughout, see [`units`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Lock {
    /// Absolute instant vesting begins, millisecond epoch.
    pub start_time: Millis,
    /// Elapsed time from `start_time` until any amount may unlock.
    pub cliff_duration: Millis,
    /// Elapsed time from `start_time` until full unlock.
    /// Not a duration from the cliff end.
    pub lock_duration: Millis,
    /// Total quantity subject to this schedule, in token base units.
    pub amount: Amount,
}

impl Lock {
    /// Instant at which the cliff ends and linear release begins.
    /// Saturates: chain data can report arbitrary timestamps, and a lock
    /// pinned at the end of time must degrade to "never unlocks", not panic.
    pub fn cliff_end(&self) -> Millis {
        self.start_time.saturating_add(self.cliff_duration)
    }

    /// Instant at which the full `amount` is unlocked. Saturates, see
    /// [`Self::cliff_end`].
    pub fn full_unlock(&self) -> Millis {
        self.start_time.saturating_add(self.lock_duration)
    }

    /// Same schedule, different amount. NonClaim positions unlock their full
    /// allocation even when the raw lock's own amount field differs.
    pub fn with_amount(&self, amount: Amount) -> Self {
        Lock { amount, ..*self }
    }
}

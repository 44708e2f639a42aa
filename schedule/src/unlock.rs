use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{Amount, Lock, Millis, SECOND};

/// Unlock state of a single lock at one evaluation instant.
///
/// Derived data, always recomputable from `(Lock, Millis)`; never persisted
/// as authoritative.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct UnlockSchedule {
    /// Instant the cliff ends, millisecond epoch.
    pub cliff_end: Millis,
    /// Instant the lock is fully unlocked, millisecond epoch.
    pub full_unlock: Millis,
    /// Amount unlocked at the evaluation instant. Never exceeds the lock's
    /// amount.
    pub current_unlocked: Amount,
    pub fully_unlocked: bool,
}

/// One sample of the aggregate unlock curve.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct UnlockPoint {
    pub timestamp: Millis,
    /// Sum of `current_unlocked` over all locks at this instant.
    pub unlocked: Amount,
    /// Same value under the name chart consumers expect; the unlock curve
    /// is cumulative by construction.
    pub cumulative: Amount,
}

/// Computes the unlock state of `lock` at instant `at`.
///
/// Mirrors the contract's `unlockedAt` arithmetic exactly:
/// * before the cliff end (strict `<`): nothing is unlocked;
/// * at or past full unlock (`>=`): the whole amount is unlocked;
/// * strictly in between: linear release, with elapsed time measured from
///   `start_time` (not from the cliff end) and truncated to whole seconds
///   before the division, matching the contract's formula.
///
/// All arithmetic is 256-bit integer math. Token amounts routinely exceed
/// 2^53 base units, so floating point is never an option here.
pub fn unlock_schedule(lock: &Lock, at: Millis) -> UnlockSchedule {
    let cliff_end = lock.cliff_end();
    let full_unlock = lock.full_unlock();

    if at < cliff_end {
        return UnlockSchedule {
            cliff_end,
            full_unlock,
            current_unlocked: Amount::ZERO,
            fully_unlocked: false,
        };
    }

    if at >= full_unlock {
        return UnlockSchedule {
            cliff_end,
            full_unlock,
            current_unlocked: lock.amount,
            fully_unlocked: true,
        };
    }

    let elapsed_secs = (at - lock.start_time) / SECOND;
    let total_secs = lock.lock_duration / SECOND;

    // A sub-second lock duration would divide by zero; nothing unlocks.
    let current_unlocked = if total_secs == 0 {
        Amount::ZERO
    } else {
        let unlocked = lock
            .amount
            .u256()
            .saturating_mul(U256::from(elapsed_secs))
            / U256::from(total_secs);
        // ceiling that the formula should never hit
        Amount::new(unlocked.min(lock.amount.u256()))
    };

    UnlockSchedule {
        cliff_end,
        full_unlock,
        current_unlocked,
        fully_unlocked: false,
    }
}

/// Samples the aggregate unlock curve of `locks` across
/// `[range_start, range_end]`.
///
/// Produces `points + 1` evenly spaced samples, inclusive of both ends; the
/// final sample lands exactly on `range_end`. Pure function of its inputs,
/// callable repeatedly with no shared state.
pub fn unlock_series(
    locks: &[Lock],
    range_start: Millis,
    range_end: Millis,
    points: usize,
) -> Vec<UnlockPoint> {
    let span = range_end.saturating_sub(range_start) as u128;
    let mut series = Vec::with_capacity(points + 1);
    for i in 0..=points {
        let timestamp = if points == 0 {
            range_start
        } else {
            range_start + ((span * i as u128) / points as u128) as Millis
        };
        let mut unlocked = U256::ZERO;
        for lock in locks {
            unlocked = unlocked
                .saturating_add(unlock_schedule(lock, timestamp).current_unlocked.u256());
        }
        series.push(UnlockPoint {
            timestamp,
            unlocked: Amount::new(unlocked),
            cumulative: Amount::new(unlocked),
        });
    }
    series
}

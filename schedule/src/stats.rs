use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{unlock_schedule, Amount, Lock, Millis};

/// Aggregate unlock state across a set of locks at one instant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct UnlockStats {
    /// Sum of all lock amounts.
    pub total_locked: Amount,
    /// Sum of currently unlocked amounts.
    pub total_unlocked: Amount,
    /// Locks whose full amount has unlocked.
    pub fully_unlocked: usize,
    /// Locks still within their cliff.
    pub in_cliff: usize,
    /// Locks past the cliff and actively releasing.
    pub unlocking: usize,
    /// `total_unlocked / total_locked` as a percentage with two decimal
    /// places, `"0.00"` when nothing is locked.
    pub unlock_percentage: String,
}

/// Tallies unlock state over `locks` at instant `at`.
pub fn unlock_stats(locks: &[Lock], at: Millis) -> UnlockStats {
    let mut total_locked = U256::ZERO;
    let mut total_unlocked = U256::ZERO;
    let mut fully_unlocked = 0;
    let mut in_cliff = 0;
    let mut unlocking = 0;

    for lock in locks {
        total_locked = total_locked.saturating_add(lock.amount.u256());
        let schedule = unlock_schedule(lock, at);
        total_unlocked = total_unlocked.saturating_add(schedule.current_unlocked.u256());
        if schedule.fully_unlocked {
            fully_unlocked += 1;
        } else if at < schedule.cliff_end {
            in_cliff += 1;
        } else {
            unlocking += 1;
        }
    }

    UnlockStats {
        total_locked: Amount::new(total_locked),
        total_unlocked: Amount::new(total_unlocked),
        fully_unlocked,
        in_cliff,
        unlocking,
        unlock_percentage: percentage(total_unlocked, total_locked),
    }
}

/// Integer basis points rendered with two decimals. The division-by-zero
/// case returns the display default rather than erroring.
fn percentage(unlocked: U256, locked: U256) -> String {
    if locked.is_zero() {
        return "0.00".to_string();
    }
    let bps = unlocked.saturating_mul(U256::from(10_000u64)) / locked;
    let hundred = U256::from(100u64);
    format!("{}.{:02}", bps / hundred, (bps % hundred).to::<u64>())
}

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use atp_schedule::{Amount, Lock, UnlockSchedule};

/// Contract-level vesting behavior. Mutually exclusive; reported by the
/// contract's own type discriminator.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AtpKind {
    /// Linear release after a cliff, claimed directly.
    Linear,
    /// Release gated on an off-schedule milestone outcome.
    Milestone,
    /// Unlocks like Linear, but claims flow indirectly via stake/unstake.
    NonClaim,
}

impl AtpKind {
    /// Mapping defined by the contract enum: 0, 1, 2. Anything else is
    /// unknown; the fetcher falls back to Linear for compatibility but
    /// warns, so ABI drift stays visible.
    pub fn from_discriminator(value: u8) -> Option<Self> {
        match value {
            0 => Some(AtpKind::Linear),
            1 => Some(AtpKind::Milestone),
            2 => Some(AtpKind::NonClaim),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    Pending,
    Succeeded,
    Failed,
}

/// State snapshot of one discovered vesting contract.
///
/// Built once per discovery cycle and never mutated; the next refresh
/// supersedes it wholesale.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AtpRecord {
    pub address: Address,
    pub kind: AtpKind,
    pub beneficiary: Address,
    pub allocation: Amount,
    /// Never exceeds `allocation`.
    pub claimed: Amount,
    pub claimable: Amount,
    /// Token balance the position actually holds. May legitimately be below
    /// `allocation - claimed` when funds are staked elsewhere.
    pub balance: Amount,
    pub is_revokable: bool,
    pub is_revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_lock: Option<Lock>,
    /// Present only for Milestone positions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<String>,
    /// No read for this exists in the minimal ABI; carried for consumers
    /// that learn the outcome elsewhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_status: Option<MilestoneStatus>,
    /// Unlock state at fetch time, derived from [`Self::effective_lock`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlock_schedule: Option<UnlockSchedule>,
}

impl AtpRecord {
    /// The lock actually governing this position's unlock curve.
    ///
    /// NonClaim positions release their full `allocation` even when the raw
    /// lock's own amount field differs; their claim flow is indirect, but
    /// unlocking progresses identically to Linear.
    pub fn effective_lock(&self) -> Option<Lock> {
        self.global_lock.map(|lock| match self.kind {
            AtpKind::NonClaim => lock.with_amount(self.allocation),
            _ => lock,
        })
    }
}

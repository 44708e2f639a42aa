use serde::{Deserialize, Serialize};

use atp_schedule::Amount;

use crate::record::{AtpKind, AtpRecord};

/// Totals for one ATP kind.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct KindStats {
    pub count: usize,
    pub total_allocation: Amount,
    pub total_claimed: Amount,
    pub total_claimable: Amount,
}

/// Totals and per-kind breakdowns across one discovery cycle's records.
/// Purely derived; recomputed per cycle.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AggregateStats {
    pub total_atps: usize,
    pub total_allocation: Amount,
    pub total_claimed: Amount,
    pub total_claimable: Amount,
    pub total_balance: Amount,
    pub linear: KindStats,
    pub milestone: KindStats,
    pub non_claim: KindStats,
    /// Size of the candidate holder set the run started from; supplied by
    /// the external holder provider, not derived from the records.
    pub holder_count: usize,
}

/// Single-pass tally over `records`.
pub fn aggregate_stats(records: &[AtpRecord], holder_count: usize) -> AggregateStats {
    let mut stats = AggregateStats {
        total_atps: records.len(),
        holder_count,
        ..AggregateStats::default()
    };
    for record in records {
        stats.total_allocation = stats.total_allocation.saturating_add(record.allocation);
        stats.total_claimed = stats.total_claimed.saturating_add(record.claimed);
        stats.total_claimable = stats.total_claimable.saturating_add(record.claimable);
        stats.total_balance = stats.total_balance.saturating_add(record.balance);

        let slot = match record.kind {
            AtpKind::Linear => &mut stats.linear,
            AtpKind::Milestone => &mut stats.milestone,
            AtpKind::NonClaim => &mut stats.non_claim,
        };
        slot.count += 1;
        slot.total_allocation = slot.total_allocation.saturating_add(record.allocation);
        slot.total_claimed = slot.total_claimed.saturating_add(record.claimed);
        slot.total_claimable = slot.total_claimable.saturating_add(record.claimable);
    }
    stats
}

use alloy_primitives::Address;

use crate::retry::RetryPolicy;

/// Tunables for one discovery run.
#[derive(Clone, Copy, Debug)]
pub struct DiscoveryConfig {
    /// The ERC-20 whose positions are being discovered; balance reads go
    /// against this contract.
    pub token: Address,
    /// Upper bound on candidates probed per run. Zero means unlimited.
    pub max_candidates: usize,
    /// Addresses handled per settled batch; bounds peak in-flight reads.
    pub batch_size: usize,
    pub retry: RetryPolicy,
}

impl DiscoveryConfig {
    pub fn new(token: Address) -> Self {
        DiscoveryConfig {
            token,
            max_candidates: 1000,
            batch_size: 50,
            retry: RetryPolicy::default(),
        }
    }
}

//! Orchestrates probe and fetch over a large candidate set in bounded
//! batches. Two-pass by design, matching the cost profile: the probe is two
//! cheap reads and most candidates are plain holder addresses that fail it;
//! only the confirmed few get the full fetch.

use alloy_primitives::Address;
use futures::future::join_all;

use crate::config::DiscoveryConfig;
use crate::error::FetchError;
use crate::fetch::fetch_atp;
use crate::probe::is_atp_contract;
use crate::reader::ContractReader;
use crate::record::AtpRecord;

/// Outcome of a discovery run: every successfully fetched record, plus a
/// diagnostic entry for each confirmed ATP that kept failing. Partial
/// failure never escalates to run failure.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    pub records: Vec<AtpRecord>,
    pub failures: Vec<FetchFailure>,
}

#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub address: Address,
    pub error: FetchError,
}

/// Probes every candidate and fetches the confirmed subset.
///
/// Candidates beyond `config.max_candidates` are ignored. Within a batch
/// all probes, then all fetches, run concurrently; a batch settles fully
/// before the next one starts, which caps in-flight reads at one batch's
/// width. One failing address never aborts its batch or the run.
pub async fn discover_and_fetch<R: ContractReader>(
    reader: &R,
    config: &DiscoveryConfig,
    candidates: &[Address],
) -> DiscoveryOutcome {
    let capped = if config.max_candidates > 0 && candidates.len() > config.max_candidates {
        &candidates[..config.max_candidates]
    } else {
        candidates
    };
    let batch_size = config.batch_size.max(1);

    let mut outcome = DiscoveryOutcome::default();
    for (index, batch) in capped.chunks(batch_size).enumerate() {
        tracing::info!(
            target: "atp_discovery",
            batch = index + 1,
            candidates = batch.len(),
            "probing candidate batch"
        );
        let probes = join_all(batch.iter().map(|addr| is_atp_contract(reader, *addr))).await;
        let confirmed: Vec<Address> = batch
            .iter()
            .zip(probes)
            .filter_map(|(addr, is_atp)| is_atp.then_some(*addr))
            .collect();
        if confirmed.is_empty() {
            continue;
        }

        let fetched = join_all(
            confirmed
                .iter()
                .map(|addr| fetch_atp(reader, config, *addr)),
        )
        .await;
        for (address, result) in confirmed.into_iter().zip(fetched) {
            match result {
                Ok(Some(record)) => outcome.records.push(record),
                // The probe said yes but the full read said no; a transient
                // revert can do that, and omission is right either way.
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        target: "atp_discovery",
                        address = %format!("{address:#x}"),
                        %error,
                        "dropping ATP after exhausted retries"
                    );
                    outcome.failures.push(FetchFailure { address, error });
                }
            }
        }
        tracing::info!(
            target: "atp_discovery",
            batch = index + 1,
            found = outcome.records.len(),
            "batch settled"
        );
    }
    outcome
}

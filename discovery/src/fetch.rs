//! Full state retrieval for a single candidate position: one retry-wrapped
//! attempt issues every read concurrently, then a single pass separates
//! "not an ATP" from "required field missing" from "optional field absent"
//! before the record is built.

use alloy_primitives::Address;

use atp_schedule::{now_millis, unlock_schedule, Amount, Lock, SECOND};

use crate::abi::{self, GlobalLockRaw};
use crate::config::DiscoveryConfig;
use crate::error::{FetchError, ReadError};
use crate::reader::ContractReader;
use crate::record::{AtpKind, AtpRecord};
use crate::retry::with_retry;

/// Fetches the full state of a suspected ATP.
///
/// `Ok(None)` means the address turned out not to be a vesting contract:
/// the type-discriminator read itself failed, which is an expected outcome,
/// not an error. A `FetchError` means the address almost certainly is an
/// ATP, but a required read kept failing through every retry, or the lock
/// it reports is structurally invalid; neither is silently dropped.
pub async fn fetch_atp<R: ContractReader>(
    reader: &R,
    config: &DiscoveryConfig,
    address: Address,
) -> Result<Option<AtpRecord>, FetchError> {
    with_retry(config.retry, || fetch_once(reader, config, address)).await
}

async fn fetch_once<R: ContractReader>(
    reader: &R,
    config: &DiscoveryConfig,
    address: Address,
) -> Result<Option<AtpRecord>, FetchError> {
    let (
        kind,
        beneficiary,
        allocation,
        claimed,
        claimable,
        is_revokable,
        global_lock,
        balance,
        is_revoked,
        milestone_id,
    ) = futures::join!(
        abi::get_type(reader, address),
        abi::get_beneficiary(reader, address),
        abi::get_allocation(reader, address),
        abi::get_claimed(reader, address),
        abi::get_claimable(reader, address),
        abi::get_is_revokable(reader, address),
        abi::get_global_lock(reader, address),
        abi::balance_of(reader, config.token, address),
        abi::get_is_revoked(reader, address),
        abi::get_milestone_id(reader, address),
    );

    // The discriminator failing is the one non-error outcome: the address
    // is simply not a vesting contract.
    let raw_kind = match kind {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };

    let kind = AtpKind::from_discriminator(raw_kind).unwrap_or_else(|| {
        tracing::warn!(
            target: "atp_fetch",
            address = %format!("{address:#x}"),
            discriminator = raw_kind,
            "unrecognized type discriminator, defaulting to linear"
        );
        AtpKind::Linear
    });

    let beneficiary = required(address, "getBeneficiary", beneficiary)?;
    let allocation = Amount::new(required(address, "getAllocation", allocation)?);
    let claimed = Amount::new(required(address, "getClaimed", claimed)?);
    let claimable = Amount::new(required(address, "getClaimable", claimable)?);
    let is_revokable = required(address, "getIsRevokable", is_revokable)?;
    let lock_raw = required(address, "getGlobalLock", global_lock)?;
    let balance = Amount::new(required(address, "balanceOf", balance)?);

    let lock = convert_lock(&lock_raw);
    lock.validate()
        .map_err(|source| FetchError::MalformedLock { address, source })?;

    // Optional reads default silently: not every ATP variant exposes them.
    let is_revoked = is_revoked.unwrap_or(false);
    let milestone_id = match kind {
        AtpKind::Milestone => milestone_id.ok().map(|id| id.to_string()),
        _ => None,
    };

    let mut record = AtpRecord {
        address,
        kind,
        beneficiary,
        allocation,
        claimed,
        claimable,
        balance,
        is_revokable,
        is_revoked,
        global_lock: Some(lock),
        milestone_id,
        milestone_status: None,
        unlock_schedule: None,
    };
    record.unlock_schedule = record
        .effective_lock()
        .map(|lock| unlock_schedule(&lock, now_millis()));
    Ok(Some(record))
}

fn required<T>(
    address: Address,
    field: &'static str,
    result: Result<T, ReadError>,
) -> Result<T, FetchError> {
    result.map_err(|source| FetchError::RequiredRead {
        address,
        field,
        source,
    })
}

/// The contract's lock tuple carries absolute second-denominated timestamps;
/// everything downstream runs on millisecond instants and durations measured
/// from `start_time`. Tuples with cliff or end before start saturate to zero
/// durations and land in the math layer's zero-duration guard; a cliff past
/// the end survives conversion and is caught by `Lock::validate` instead.
fn convert_lock(raw: &GlobalLockRaw) -> Lock {
    let start = raw.start_time.saturating_to::<u64>();
    let cliff = raw.cliff.saturating_to::<u64>();
    let end = raw.end_time.saturating_to::<u64>();
    Lock {
        start_time: start.saturating_mul(SECOND),
        cliff_duration: cliff.saturating_sub(start).saturating_mul(SECOND),
        lock_duration: end.saturating_sub(start).saturating_mul(SECOND),
        amount: Amount::new(raw.amount),
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::U256;

    use super::*;

    #[test]
    fn lock_conversion_turns_timestamps_into_durations() {
        let raw = GlobalLockRaw {
            start_time: U256::from(1_700_000_000u64),
            cliff: U256::from(1_702_592_000u64),
            end_time: U256::from(1_731_536_000u64),
            amount: U256::from(5u64),
        };
        let lock = convert_lock(&raw);
        assert_eq!(lock.start_time, 1_700_000_000_000);
        assert_eq!(lock.cliff_duration, 2_592_000_000);
        assert_eq!(lock.lock_duration, 31_536_000_000);
        assert_eq!(lock.amount, Amount::from(5u128));
    }

    #[test]
    fn degenerate_lock_tuples_saturate_to_zero_durations() {
        let raw = GlobalLockRaw {
            start_time: U256::from(2_000u64),
            cliff: U256::from(1_000u64),
            end_time: U256::from(500u64),
            amount: U256::ZERO,
        };
        let lock = convert_lock(&raw);
        assert_eq!(lock.cliff_duration, 0);
        assert_eq!(lock.lock_duration, 0);
    }
}

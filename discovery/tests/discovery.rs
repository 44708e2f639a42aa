//! End-to-end pipeline tests against a scripted in-memory chain.

use std::collections::HashMap;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol_data, SolCall, SolType, SolValue};

use atp_schedule::{Amount, ONE_TOKEN};

use atp_discovery::abi::{IAllocationPosition, IERC20};
use atp_discovery::{
    aggregate_stats, discover_and_fetch, fetch_atp, is_atp_contract, AtpKind, BatchingReader,
    CallTransport, DiscoveryConfig, FetchError, ReadError, RetryPolicy, ViewCall,
    DEFAULT_MAX_BATCH,
};

#[derive(Clone, Default)]
struct FakePosition {
    kind: u8,
    beneficiary: Address,
    allocation: U256,
    claimed: U256,
    claimable: U256,
    revokable: bool,
    /// `None` models a variant without the `getIsRevoked` function.
    revoked: Option<bool>,
    milestone_id: Option<U256>,
    /// (start, cliff, end) in seconds, plus the raw lock amount.
    lock: (u64, u64, u64, U256),
    balance: U256,
    /// Makes every `getAllocation` read fail, on every attempt.
    break_allocation: bool,
}

struct FakeChain {
    token: Address,
    positions: HashMap<Address, FakePosition>,
}

impl FakeChain {
    fn new(token: Address) -> Self {
        FakeChain {
            token,
            positions: HashMap::new(),
        }
    }

    fn with_position(mut self, address: Address, position: FakePosition) -> Self {
        self.positions.insert(address, position);
        self
    }

    fn answer(&self, call: &ViewCall) -> Result<Bytes, ReadError> {
        let selector: [u8; 4] = call
            .calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| ReadError::Decode("calldata too short".to_string()))?;

        if call.target == self.token && selector == IERC20::balanceOfCall::SELECTOR {
            let decoded = IERC20::balanceOfCall::abi_decode(&call.calldata)
                .map_err(|err| ReadError::Decode(err.to_string()))?;
            let balance = self
                .positions
                .get(&decoded.account)
                .map(|p| p.balance)
                .unwrap_or_default();
            return Ok(balance.abi_encode().into());
        }

        let revert = || ReadError::Revert {
            target: call.target,
        };
        let position = self.positions.get(&call.target).ok_or_else(revert)?;
        match selector {
            s if s == IAllocationPosition::getTypeCall::SELECTOR => {
                Ok(sol_data::Uint::<8>::abi_encode(&position.kind).into())
            }
            s if s == IAllocationPosition::getBeneficiaryCall::SELECTOR => {
                Ok(position.beneficiary.abi_encode().into())
            }
            s if s == IAllocationPosition::getAllocationCall::SELECTOR => {
                if position.break_allocation {
                    Err(ReadError::Transport("injected failure".to_string()))
                } else {
                    Ok(position.allocation.abi_encode().into())
                }
            }
            s if s == IAllocationPosition::getClaimedCall::SELECTOR => {
                Ok(position.claimed.abi_encode().into())
            }
            s if s == IAllocationPosition::getClaimableCall::SELECTOR => {
                Ok(position.claimable.abi_encode().into())
            }
            s if s == IAllocationPosition::getIsRevokableCall::SELECTOR => {
                Ok(position.revokable.abi_encode().into())
            }
            s if s == IAllocationPosition::getIsRevokedCall::SELECTOR => position
                .revoked
                .map(|value| value.abi_encode().into())
                .ok_or_else(revert),
            s if s == IAllocationPosition::getGlobalLockCall::SELECTOR => {
                let (start, cliff, end, amount) = position.lock;
                let tuple = (
                    U256::from(start),
                    U256::from(cliff),
                    U256::from(end),
                    amount,
                );
                Ok(tuple.abi_encode().into())
            }
            s if s == IAllocationPosition::getMilestoneIdCall::SELECTOR => position
                .milestone_id
                .map(|value| value.abi_encode().into())
                .ok_or_else(revert),
            _ => Err(revert()),
        }
    }
}

impl CallTransport for FakeChain {
    async fn execute(
        &self,
        calls: &[ViewCall],
    ) -> Result<Vec<Result<Bytes, ReadError>>, ReadError> {
        Ok(calls.iter().map(|call| self.answer(call)).collect())
    }
}

fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn token() -> Address {
    addr(0xee)
}

fn linear_position(beneficiary: Address, allocation: u128) -> FakePosition {
    FakePosition {
        kind: 0,
        beneficiary,
        allocation: U256::from(allocation),
        claimed: U256::from(allocation / 10),
        claimable: U256::from(allocation / 20),
        revokable: true,
        revoked: Some(false),
        // started 2021, long over
        lock: (1_600_000_000, 1_602_592_000, 1_631_536_000, U256::from(allocation)),
        balance: U256::from(allocation / 2),
        ..FakePosition::default()
    }
}

fn config() -> DiscoveryConfig {
    DiscoveryConfig {
        retry: RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        },
        ..DiscoveryConfig::new(token())
    }
}

fn reader(chain: FakeChain) -> BatchingReader {
    BatchingReader::spawn(chain, DEFAULT_MAX_BATCH)
}

#[tokio::test]
async fn probe_recognizes_positions_and_rejects_everything_else() {
    let chain = FakeChain::new(token())
        .with_position(addr(1), linear_position(addr(0xb1), 100 * ONE_TOKEN))
        .with_position(
            addr(2),
            FakePosition {
                kind: 9,
                beneficiary: addr(0xb2),
                ..FakePosition::default()
            },
        );
    let reader = reader(chain);

    assert!(is_atp_contract(&reader, addr(1)).await);
    // discriminator out of range
    assert!(!is_atp_contract(&reader, addr(2)).await);
    // plain holder address
    assert!(!is_atp_contract(&reader, addr(3)).await);
    assert!(!is_atp_contract(&reader, Address::ZERO).await);
}

#[tokio::test]
async fn fetch_builds_a_complete_record() {
    let chain = FakeChain::new(token()).with_position(
        addr(1),
        linear_position(addr(0xb1), 1000 * ONE_TOKEN),
    );
    let reader = reader(chain);

    let record = fetch_atp(&reader, &config(), addr(1))
        .await
        .unwrap()
        .expect("position should fetch");

    assert_eq!(record.kind, AtpKind::Linear);
    assert_eq!(record.beneficiary, addr(0xb1));
    assert_eq!(record.allocation, Amount::from(1000 * ONE_TOKEN));
    assert!(record.is_revokable);
    assert!(!record.is_revoked);
    assert_eq!(record.milestone_id, None);

    let lock = record.global_lock.expect("lock should be present");
    assert_eq!(lock.start_time, 1_600_000_000_000);
    assert_eq!(lock.cliff_duration, 2_592_000_000);
    assert_eq!(lock.lock_duration, 31_536_000_000);

    // the lock ended years ago, so the fetch-time snapshot is fully unlocked
    let schedule = record.unlock_schedule.expect("schedule should be present");
    assert!(schedule.fully_unlocked);
    assert_eq!(schedule.current_unlocked, record.allocation);
}

#[tokio::test]
async fn fetch_returns_none_for_non_contracts() {
    let reader = reader(FakeChain::new(token()));
    let result = fetch_atp(&reader, &config(), addr(9)).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn optional_reads_default_when_missing() {
    let mut position = linear_position(addr(0xb1), 100 * ONE_TOKEN);
    position.revoked = None;
    let reader = reader(FakeChain::new(token()).with_position(addr(1), position));

    let record = fetch_atp(&reader, &config(), addr(1))
        .await
        .unwrap()
        .expect("position should fetch");
    assert!(!record.is_revoked);
}

#[tokio::test]
async fn milestone_id_is_kept_only_for_milestone_positions() {
    let mut milestone = linear_position(addr(0xb1), 100 * ONE_TOKEN);
    milestone.kind = 1;
    milestone.milestone_id = Some(U256::from(42u64));
    let mut linear = linear_position(addr(0xb2), 100 * ONE_TOKEN);
    linear.milestone_id = Some(U256::from(7u64));
    let reader = reader(
        FakeChain::new(token())
            .with_position(addr(1), milestone)
            .with_position(addr(2), linear),
    );

    let record = fetch_atp(&reader, &config(), addr(1)).await.unwrap().unwrap();
    assert_eq!(record.kind, AtpKind::Milestone);
    assert_eq!(record.milestone_id, Some("42".to_string()));

    let record = fetch_atp(&reader, &config(), addr(2)).await.unwrap().unwrap();
    assert_eq!(record.milestone_id, None);
}

#[tokio::test]
async fn unknown_discriminator_defaults_to_linear() {
    let mut position = linear_position(addr(0xb1), 100 * ONE_TOKEN);
    position.kind = 9;
    let reader = reader(FakeChain::new(token()).with_position(addr(1), position));

    let record = fetch_atp(&reader, &config(), addr(1))
        .await
        .unwrap()
        .expect("position should fetch");
    assert_eq!(record.kind, AtpKind::Linear);
}

#[tokio::test]
async fn non_claim_positions_unlock_their_full_allocation() {
    let mut position = linear_position(addr(0xb1), 1000 * ONE_TOKEN);
    position.kind = 2;
    // raw lock amount deliberately disagrees with the allocation
    position.lock.3 = U256::from(ONE_TOKEN);
    let reader = reader(FakeChain::new(token()).with_position(addr(1), position));

    let record = fetch_atp(&reader, &config(), addr(1))
        .await
        .unwrap()
        .expect("position should fetch");
    assert_eq!(record.kind, AtpKind::NonClaim);

    let effective = record.effective_lock().expect("lock should be present");
    assert_eq!(effective.amount, record.allocation);

    let schedule = record.unlock_schedule.expect("schedule should be present");
    assert_eq!(schedule.current_unlocked, Amount::from(1000 * ONE_TOKEN));
}

#[tokio::test]
async fn fetch_rejects_a_cliff_past_the_lock_end() {
    let mut position = linear_position(addr(0xb1), 100 * ONE_TOKEN);
    // cliff timestamp after the end timestamp: every read succeeds, but the
    // reported schedule is nonsense
    position.lock = (
        1_600_000_000,
        1_631_536_000,
        1_602_592_000,
        U256::from(100 * ONE_TOKEN),
    );
    let reader = reader(FakeChain::new(token()).with_position(addr(1), position));

    let error = fetch_atp(&reader, &config(), addr(1))
        .await
        .expect_err("malformed lock should not become a record");
    assert!(matches!(error, FetchError::MalformedLock { address, .. } if address == addr(1)));
}

#[tokio::test]
async fn discovery_tolerates_per_address_failure() {
    // ten candidates: two healthy positions, one position whose required
    // read fails on every attempt, seven plain holder addresses
    let chain = FakeChain::new(token())
        .with_position(addr(2), linear_position(addr(0xb2), 100 * ONE_TOKEN))
        .with_position(
            addr(4),
            FakePosition {
                break_allocation: true,
                ..linear_position(addr(0xb4), 100 * ONE_TOKEN)
            },
        )
        .with_position(addr(7), linear_position(addr(0xb7), 200 * ONE_TOKEN));
    let reader = reader(chain);
    let candidates: Vec<Address> = (1..=10).map(addr).collect();

    let mut config = config();
    config.batch_size = 4;
    let outcome = discover_and_fetch(&reader, &config, &candidates).await;

    let mut found: Vec<Address> = outcome.records.iter().map(|r| r.address).collect();
    found.sort();
    assert_eq!(found, vec![addr(2), addr(7)]);

    assert_eq!(outcome.failures.len(), 1);
    let failure = &outcome.failures[0];
    assert_eq!(failure.address, addr(4));
    assert!(matches!(
        failure.error,
        FetchError::RequiredRead {
            field: "getAllocation",
            ..
        }
    ));
}

#[tokio::test]
async fn discovery_honors_the_candidate_cap() {
    let chain = FakeChain::new(token())
        .with_position(addr(1), linear_position(addr(0xb1), 100 * ONE_TOKEN))
        .with_position(addr(9), linear_position(addr(0xb9), 100 * ONE_TOKEN));
    let reader = reader(chain);
    let candidates: Vec<Address> = (1..=10).map(addr).collect();

    let mut config = config();
    config.max_candidates = 5;
    let outcome = discover_and_fetch(&reader, &config, &candidates).await;

    // addr(9) sits past the cap and is never probed
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].address, addr(1));
}

#[tokio::test]
async fn stats_break_down_by_kind() {
    let mut milestone = linear_position(addr(0xb2), 200 * ONE_TOKEN);
    milestone.kind = 1;
    milestone.milestone_id = Some(U256::from(1u64));
    let chain = FakeChain::new(token())
        .with_position(addr(1), linear_position(addr(0xb1), 100 * ONE_TOKEN))
        .with_position(addr(2), milestone);
    let reader = reader(chain);
    let candidates: Vec<Address> = (1..=2).map(addr).collect();

    let outcome = discover_and_fetch(&reader, &config(), &candidates).await;
    let stats = aggregate_stats(&outcome.records, 250);

    assert_eq!(stats.total_atps, 2);
    assert_eq!(stats.holder_count, 250);
    assert_eq!(stats.total_allocation, Amount::from(300 * ONE_TOKEN));
    assert_eq!(stats.linear.count, 1);
    assert_eq!(stats.milestone.count, 1);
    assert_eq!(stats.non_claim.count, 0);
    assert_eq!(stats.linear.total_allocation, Amount::from(100 * ONE_TOKEN));
    assert_eq!(
        stats.milestone.total_allocation,
        Amount::from(200 * ONE_TOKEN)
    );
}

#[tokio::test]
async fn records_serialize_as_plain_portable_data() {
    let chain = FakeChain::new(token()).with_position(
        addr(1),
        linear_position(addr(0xb1), 1000 * ONE_TOKEN),
    );
    let reader = reader(chain);

    let record = fetch_atp(&reader, &config(), addr(1))
        .await
        .unwrap()
        .expect("position should fetch");
    let json = serde_json::to_value(&record).unwrap();

    // amounts are decimal strings, addresses lowercase hex, times plain numbers
    assert_eq!(json["allocation"], "1000000000000000000000");
    assert_eq!(
        json["address"],
        "0x0101010101010101010101010101010101010101"
    );
    assert_eq!(json["global_lock"]["start_time"], 1_600_000_000_000u64);
}

//! Minimal view surface of an ATP contract, plus typed read helpers that
//! route through a [`ContractReader`].

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};

use crate::error::ReadError;
use crate::reader::{ContractReader, ViewCall};

sol! {
    /// The interface every ATP variant exposes for detection and data
    /// fetching. Getters beyond this set are variant-specific and treated
    /// as optional reads.
    interface IAllocationPosition {
        function getType() external view returns (uint8);
        function getBeneficiary() external view returns (address);
        function getAllocation() external view returns (uint256);
        function getClaimed() external view returns (uint256);
        function getClaimable() external view returns (uint256);
        function getIsRevokable() external view returns (bool);
        function getIsRevoked() external view returns (bool);
        function getGlobalLock() external view returns (
            uint256 startTime,
            uint256 cliff,
            uint256 endTime,
            uint256 allocation
        );
        function getMilestoneId() external view returns (uint256);
    }

    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// The `getGlobalLock` tuple as the contract reports it: absolute
/// second-denominated timestamps, not durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalLockRaw {
    pub start_time: U256,
    pub cliff: U256,
    pub end_time: U256,
    pub amount: U256,
}

async fn read<R: ContractReader, C: SolCall>(
    reader: &R,
    target: Address,
    call: C,
) -> Result<C::Return, ReadError> {
    let calldata = call.abi_encode();
    let data = reader
        .read_view(ViewCall {
            target,
            calldata: calldata.into(),
        })
        .await?;
    C::abi_decode_returns(&data).map_err(|err| ReadError::Decode(err.to_string()))
}

pub async fn get_type<R: ContractReader>(reader: &R, target: Address) -> Result<u8, ReadError> {
    read(reader, target, IAllocationPosition::getTypeCall {}).await
}

pub async fn get_beneficiary<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<Address, ReadError> {
    read(reader, target, IAllocationPosition::getBeneficiaryCall {}).await
}

pub async fn get_allocation<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<U256, ReadError> {
    read(reader, target, IAllocationPosition::getAllocationCall {}).await
}

pub async fn get_claimed<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<U256, ReadError> {
    read(reader, target, IAllocationPosition::getClaimedCall {}).await
}

pub async fn get_claimable<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<U256, ReadError> {
    read(reader, target, IAllocationPosition::getClaimableCall {}).await
}

pub async fn get_is_revokable<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<bool, ReadError> {
    read(reader, target, IAllocationPosition::getIsRevokableCall {}).await
}

pub async fn get_is_revoked<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<bool, ReadError> {
    read(reader, target, IAllocationPosition::getIsRevokedCall {}).await
}

pub async fn get_global_lock<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<GlobalLockRaw, ReadError> {
    let ret = read(reader, target, IAllocationPosition::getGlobalLockCall {}).await?;
    Ok(GlobalLockRaw {
        start_time: ret.startTime,
        cliff: ret.cliff,
        end_time: ret.endTime,
        amount: ret.allocation,
    })
}

pub async fn get_milestone_id<R: ContractReader>(
    reader: &R,
    target: Address,
) -> Result<U256, ReadError> {
    read(reader, target, IAllocationPosition::getMilestoneIdCall {}).await
}

/// ERC-20 balance of `account` on the `token` contract.
pub async fn balance_of<R: ContractReader>(
    reader: &R,
    token: Address,
    account: Address,
) -> Result<U256, ReadError> {
    read(reader, token, IERC20::balanceOfCall { account }).await
}

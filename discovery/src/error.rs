use alloy_primitives::Address;
use thiserror::Error;

use atp_schedule::ScheduleError;

/// Failure of a single contract read.
///
/// Cloneable so a whole-batch transport failure can fan out to every caller
/// waiting on that batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("call to {target} reverted")]
    Revert { target: Address },
    #[error("could not decode return data: {0}")]
    Decode(String),
    #[error("reader shut down before the call resolved")]
    ChannelClosed,
}

/// A confirmed-or-suspected ATP whose state could not be captured.
///
/// Distinct from "not an ATP at all", which is an expected outcome and not
/// an error. Reaching this means retries were already exhausted on a read
/// the record cannot be built without.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("required read `{field}` failed for {address}: {source}")]
    RequiredRead {
        address: Address,
        field: &'static str,
        source: ReadError,
    },
    /// The contract's reads all succeeded but the reported lock is
    /// structurally invalid. Surfaced rather than turned into a record
    /// whose numbers would be silently wrong.
    #[error("malformed lock data for {address}: {source}")]
    MalformedLock {
        address: Address,
        source: ScheduleError,
    },
}

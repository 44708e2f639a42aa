//! Discovery and data-fetch pipeline for Allocation/Token Positions (ATPs):
//! on-chain vesting contracts tied to an ERC-20 token.
//!
//! Data flows in one direction:
//!
//! candidate addresses → [`discover_and_fetch`] → [`is_atp_contract`]
//! (filter) → [`fetch_atp`] (enrich) → [`AtpRecord`]s → unlock schedules
//! (see the `atp-schedule` crate) → [`aggregate_stats`].
//!
//! Everything is read-only aggregation: no historical indexing, no claim or
//! write transactions. Network reads go through a [`ContractReader`], which
//! is constructed once and injected: the [`BatchingReader`] over an
//! [`RpcTransport`] in production, a scripted fake in tests.

pub mod abi;
pub mod config; pub use config::*;
pub mod error; pub use error::*;
pub mod fetch; pub use fetch::*;
pub mod pipeline; pub use pipeline::*;
pub mod probe; pub use probe::*;
pub mod reader; pub use reader::*;
pub mod record; pub use record::*;
pub mod retry; pub use retry::*;
pub mod rpc; pub use rpc::*;
pub mod stats; pub use stats::*;

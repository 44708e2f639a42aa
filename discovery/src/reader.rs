//! The "read one view function on one contract" capability, with
//! transparent request batching.
//!
//! Callers issue independent [`ContractReader::read_view`] calls; the
//! [`BatchingReader`] coalesces everything enqueued within the same
//! scheduling tick into one [`CallTransport`] round trip. Invisible to
//! callers: each gets exactly one resolution for its own request, and one
//! call's revert leaves its batch siblings intact.

use std::future::Future;

use alloy_primitives::{Address, Bytes};
use tokio::sync::{mpsc, oneshot};

use crate::error::ReadError;

/// A single `eth_call`-shaped read: raw calldata against one contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewCall {
    pub target: Address,
    pub calldata: Bytes,
}

/// Chain read capability consumed by the probe and the fetcher.
///
/// Constructed once per process and passed in explicitly; there is no
/// module-level client singleton to hide behind.
pub trait ContractReader: Send + Sync {
    fn read_view(
        &self,
        call: ViewCall,
    ) -> impl Future<Output = Result<Bytes, ReadError>> + Send;
}

/// One network round trip executing a slice of calls.
///
/// Implementations must return exactly one result per call, index-aligned,
/// and a failed call must not fail its siblings. The outer error is for
/// failures of the round trip as a whole.
pub trait CallTransport: Send + Sync + 'static {
    fn execute(
        &self,
        calls: &[ViewCall],
    ) -> impl Future<Output = Result<Vec<Result<Bytes, ReadError>>, ReadError>> + Send;
}

/// Largest number of reads shipped in one transport round trip.
pub const DEFAULT_MAX_BATCH: usize = 100;

struct Pending {
    call: ViewCall,
    reply: oneshot::Sender<Result<Bytes, ReadError>>,
}

/// Coalesces concurrent `read_view` calls into fewer transport round trips.
///
/// Each caller parks on a oneshot while a background worker drains whatever
/// has queued up in the current tick and ships it as one batch. The queue is
/// the only shared mutable state in the pipeline.
#[derive(Clone)]
pub struct BatchingReader {
    queue: mpsc::UnboundedSender<Pending>,
}

impl BatchingReader {
    /// Spawns the draining worker on the current runtime. The worker exits
    /// once every reader handle is dropped.
    pub fn spawn<T: CallTransport>(transport: T, max_batch: usize) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(transport, rx, max_batch.max(1)));
        BatchingReader { queue }
    }
}

impl ContractReader for BatchingReader {
    async fn read_view(&self, call: ViewCall) -> Result<Bytes, ReadError> {
        let (reply, response) = oneshot::channel();
        self.queue
            .send(Pending { call, reply })
            .map_err(|_| ReadError::ChannelClosed)?;
        response.await.unwrap_or(Err(ReadError::ChannelClosed))
    }
}

async fn drain<T: CallTransport>(
    transport: T,
    mut rx: mpsc::UnboundedReceiver<Pending>,
    max_batch: usize,
) {
    while let Some(first) = rx.recv().await {
        let mut pending = vec![first];
        while pending.len() < max_batch {
            match rx.try_recv() {
                Ok(next) => pending.push(next),
                Err(_) => break,
            }
        }
        let calls: Vec<ViewCall> = pending.iter().map(|p| p.call.clone()).collect();
        tracing::trace!(target: "atp_reader", batch = calls.len(), "executing read batch");
        match transport.execute(&calls).await {
            Ok(results) if results.len() == pending.len() => {
                for (entry, result) in pending.into_iter().zip(results) {
                    let _ = entry.reply.send(result);
                }
            }
            Ok(results) => {
                let err = ReadError::Transport(format!(
                    "transport returned {} results for {} calls",
                    results.len(),
                    pending.len()
                ));
                for entry in pending {
                    let _ = entry.reply.send(Err(err.clone()));
                }
            }
            Err(err) => {
                for entry in pending {
                    let _ = entry.reply.send(Err(err.clone()));
                }
            }
        }
    }
}

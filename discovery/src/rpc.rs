//! JSON-RPC transport. A single call goes straight to `eth_call`; two or
//! more ride through Multicall3 `aggregate3` with per-call failure allowed,
//! so one reverting read never poisons its batch.

use std::time::Duration;

use alloy_primitives::{address, Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use serde::Deserialize;
use serde_json::json;

use crate::error::ReadError;
use crate::reader::{CallTransport, ViewCall};

sol! {
    interface IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls)
            external
            payable
            returns (Result[] memory returnData);
    }
}

/// Canonical Multicall3 deployment, same address on every major EVM chain.
pub const MULTICALL3: Address = address!("ca11bde05977b3631167028862be2a173976ca11");

const HTTP_TIMEOUT: Duration = Duration::from_secs(8);

/// HTTP JSON-RPC `eth_call` transport.
pub struct RpcTransport {
    client: reqwest::Client,
    url: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcTransport {
    pub fn new(url: impl Into<String>) -> Result<Self, ReadError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| ReadError::Transport(format!("http client init failed: {err}")))?;
        Ok(RpcTransport {
            client,
            url: url.into(),
        })
    }

    async fn eth_call(&self, target: Address, calldata: &Bytes) -> Result<Bytes, ReadError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [
                { "to": format!("{target:#x}"), "data": calldata.to_string() },
                "latest"
            ],
        });
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ReadError::Transport(format!("eth_call request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(ReadError::Transport(format!(
                "eth_call http status {}",
                response.status()
            )));
        }
        let body: RpcResponse = response
            .json()
            .await
            .map_err(|err| ReadError::Transport(format!("eth_call body decode failed: {err}")))?;
        if let Some(err) = body.error {
            return Err(ReadError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let raw = body
            .result
            .ok_or_else(|| ReadError::Transport("eth_call response missing result".to_string()))?;
        raw.parse::<Bytes>()
            .map_err(|err| ReadError::Decode(format!("result is not hex data: {err}")))
    }
}

impl CallTransport for RpcTransport {
    async fn execute(
        &self,
        calls: &[ViewCall],
    ) -> Result<Vec<Result<Bytes, ReadError>>, ReadError> {
        match calls {
            [] => Ok(vec![]),
            [only] => Ok(vec![self.eth_call(only.target, &only.calldata).await]),
            many => {
                let aggregated = IMulticall3::aggregate3Call {
                    calls: many
                        .iter()
                        .map(|call| IMulticall3::Call3 {
                            target: call.target,
                            allowFailure: true,
                            callData: call.calldata.clone(),
                        })
                        .collect(),
                };
                let data = self
                    .eth_call(MULTICALL3, &aggregated.abi_encode().into())
                    .await?;
                let results = IMulticall3::aggregate3Call::abi_decode_returns(&data)
                    .map_err(|err| ReadError::Decode(err.to_string()))?;
                if results.len() != many.len() {
                    return Err(ReadError::Transport(format!(
                        "multicall returned {} results for {} calls",
                        results.len(),
                        many.len()
                    )));
                }
                Ok(results
                    .into_iter()
                    .zip(many)
                    .map(|(result, call)| {
                        if result.success {
                            Ok(result.returnData)
                        } else {
                            Err(ReadError::Revert {
                                target: call.target,
                            })
                        }
                    })
                    .collect())
            }
        }
    }
}

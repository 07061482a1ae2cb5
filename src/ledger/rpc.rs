//! JSON-RPC ledger client.
//!
//! Speaks the three methods the bot needs: `getBalance`, `getLatestBlockhash`
//! and `sendTransaction` (base64 wire encoding).

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::address::Address;
use super::keypair::Keypair;
use super::transaction::{sign_transfer, Blockhash};
use super::{LedgerClient, LedgerError, Signature, TransferError};

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `{"context": {...}, "value": ...}` wrapper used by most read methods.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
}

/// Ledger client backed by an HTTP JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl RpcLedgerClient {
    /// Creates a client; `client` should carry the configured timeout.
    pub fn new(client: reqwest::Client, rpc_url: impl Into<String>) -> Self {
        Self {
            client,
            rpc_url: rpc_url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        tracing::debug!("Ledger RPC call: {} {}", self.rpc_url, method);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let detail = if e.is_connect() {
                    format!("failed to connect to {}", self.rpc_url)
                } else if e.is_timeout() {
                    format!("{method} timed out")
                } else {
                    e.to_string()
                };
                LedgerError::Network(detail)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LedgerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let rpc_response: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("{method}: {e}")))?;

        if let Some(error) = rpc_response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| LedgerError::MalformedResponse(format!("{method}: missing result")))
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, LedgerError> {
        let latest: WithContext<LatestBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": "finalized" }]))
            .await?;
        latest
            .value
            .blockhash
            .parse()
            .map_err(|e| LedgerError::MalformedResponse(format!("blockhash: {e}")))
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn balance(&self, address: &Address) -> Result<u64, LedgerError> {
        let balance: WithContext<u64> = self
            .call("getBalance", json!([address.to_string()]))
            .await?;
        Ok(balance.value)
    }

    async fn transfer(
        &self,
        payer: &Keypair,
        recipient: &Address,
        lamports: u64,
    ) -> Result<Signature, TransferError> {
        let blockhash = self
            .latest_blockhash()
            .await
            .map_err(TransferError::NotSubmitted)?;
        let signed = sign_transfer(payer, recipient, lamports, &blockhash);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&signed.wire);

        let returned: String = self
            .call(
                "sendTransaction",
                json!([encoded, { "encoding": "base64" }]),
            )
            .await
            .map_err(|e| match e {
                // A JSON-RPC error object means preflight rejected the transaction
                LedgerError::Rpc { .. } => TransferError::NotSubmitted(e),
                other => {
                    tracing::warn!(
                        "Outcome of transaction {} unknown: {}",
                        signed.signature,
                        other
                    );
                    TransferError::Unconfirmed {
                        signature: signed.signature,
                        source: other,
                    }
                }
            })?;

        if returned != signed.signature.to_string() {
            tracing::warn!(
                "Ledger acknowledged signature {} for transaction {}",
                returned,
                signed.signature
            );
        }

        tracing::info!(
            "Submitted transfer of {} lamports to {}: {}",
            lamports,
            recipient,
            signed.signature
        );
        Ok(signed.signature)
    }
}

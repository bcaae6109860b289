//! Ethereum JSON-RPC client
//!
//! Only the five calls a plain value transfer needs. Quantities travel as
//! `0x`-prefixed hex strings per the Ethereum JSON-RPC conventions.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::config;
use crate::core::error::RpcError;

/// Chain operations used by the wallet service.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Balance in wei at the latest block.
    async fn get_balance(&self, address: Address) -> Result<U256, RpcError>;

    /// Next nonce, counting pending transactions.
    async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<u128, RpcError>;

    async fn chain_id(&self) -> Result<u64, RpcError>;

    /// Submits an RLP-encoded signed transaction, returning its hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP POST.
pub struct JsonRpcChainClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcChainClient {
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder().timeout(config::network::rpc_timeout()).build()?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        log::debug!("JSON-RPC {} (id {})", method, id);
        // Endpoint URLs often embed API keys
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", method, e)))?;

        if let Some(err) = parsed.error {
            return Err(RpcError::Rejected {
                code: err.code,
                message: err.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{}: response has neither result nor error", method)))
    }

    async fn call_quantity(&self, method: &str, params: Value) -> Result<U256, RpcError> {
        let value = self.call(method, params).await?;
        parse_quantity(&value).map_err(|reason| RpcError::InvalidResponse(format!("{}: {}", method, reason)))
    }
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn get_balance(&self, address: Address) -> Result<U256, RpcError> {
        self.call_quantity("eth_getBalance", json!([hex_address(address), "latest"])).await
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64, RpcError> {
        let count = self
            .call_quantity("eth_getTransactionCount", json!([hex_address(address), "pending"]))
            .await?;
        u64::try_from(count).map_err(|_| RpcError::InvalidResponse(format!("nonce {} does not fit u64", count)))
    }

    async fn gas_price(&self) -> Result<u128, RpcError> {
        let price = self.call_quantity("eth_gasPrice", json!([])).await?;
        u128::try_from(price).map_err(|_| RpcError::InvalidResponse(format!("gas price {} does not fit u128", price)))
    }

    async fn chain_id(&self) -> Result<u64, RpcError> {
        let id = self.call_quantity("eth_chainId", json!([])).await?;
        u64::try_from(id).map_err(|_| RpcError::InvalidResponse(format!("chain id {} does not fit u64", id)))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, RpcError> {
        let value = self
            .call("eth_sendRawTransaction", json!([format!("0x{}", hex::encode(raw))]))
            .await?;
        let hash = value
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("transaction hash is not a string: {}", value)))?;
        hash.parse::<B256>()
            .map_err(|e| RpcError::InvalidResponse(format!("transaction hash {:?}: {}", hash, e)))
    }
}

fn hex_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Parses a JSON-RPC quantity (`"0x1a"`).
fn parse_quantity(value: &Value) -> Result<U256, String> {
    let text = value.as_str().ok_or_else(|| format!("expected hex string, got {}", value))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| format!("quantity {:?} lacks 0x prefix", text))?;
    if digits.is_empty() {
        return Err(format!("empty quantity {:?}", text));
    }
    U256::from_str_radix(digits, 16).map_err(|e| format!("quantity {:?}: {}", text, e))
}

//! Wallet service: per-chat custodial wallets, balance queries, payments

use std::sync::Arc;

use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::{Address, U256};

use crate::core::config;
use crate::core::error::{SubmissionError, WalletError};
use crate::core::metrics;
use crate::storage::WalletStore;
use crate::wallet::chain::ChainClient;
use crate::wallet::keys::{TransferRequest, Wallet};

const WEI_PER_GWEI: u128 = 1_000_000_000;

/// Wallet operations exposed to the command handlers.
///
/// `chain` is `None` when no RPC endpoint is configured; balance and payment
/// calls then fail with [`WalletError::ChainUnavailable`].
#[derive(Clone)]
pub struct WalletService {
    wallets: Arc<dyn WalletStore>,
    chain: Option<Arc<dyn ChainClient>>,
    gas_price_override: Option<u128>,
}

impl WalletService {
    pub fn new(wallets: Arc<dyn WalletStore>, chain: Option<Arc<dyn ChainClient>>) -> Self {
        Self {
            wallets,
            chain,
            gas_price_override: None,
        }
    }

    /// Uses a fixed gas price instead of asking the node.
    pub fn with_gas_price_gwei(mut self, gwei: Option<u64>) -> Self {
        self.gas_price_override = gwei.map(|g| u128::from(g) * WEI_PER_GWEI);
        self
    }

    pub fn chain_configured(&self) -> bool {
        self.chain.is_some()
    }

    /// Returns the chat's wallet address, generating a wallet on first use.
    pub async fn create_or_get_wallet(&self, chat_id: i64) -> String {
        let wallet = self
            .wallets
            .get_or_insert_with(chat_id, Box::new(Wallet::generate))
            .await;
        wallet.address_string()
    }

    /// Balance of `address` in ether, trailing zeros trimmed.
    pub async fn get_balance(&self, address: &str) -> Result<String, WalletError> {
        let chain = self.chain.as_ref().ok_or(WalletError::ChainUnavailable)?;
        let address = parse_address(address).ok_or_else(|| WalletError::InvalidAddress(address.to_string()))?;
        let wei = chain.get_balance(address).await?;
        Ok(format_ether_trimmed(wei))
    }

    /// Sends `amount_eth` from the chat's wallet to `to_address`.
    ///
    /// Returns the `0x…` transaction hash.
    pub async fn send_payment(&self, chat_id: i64, to_address: &str, amount_eth: &str) -> Result<String, WalletError> {
        let result = self.try_send_payment(chat_id, to_address, amount_eth).await;
        metrics::record_payment(match &result {
            Ok(_) => "submitted",
            Err(WalletError::NoWallet(_)) => "no_wallet",
            Err(WalletError::ChainUnavailable) => "chain_unavailable",
            Err(_) => "failed",
        });
        result
    }

    async fn try_send_payment(&self, chat_id: i64, to_address: &str, amount_eth: &str) -> Result<String, WalletError> {
        let chain = self.chain.as_ref().ok_or(WalletError::ChainUnavailable)?;
        let wallet = self.wallets.get(chat_id).await.ok_or(WalletError::NoWallet(chat_id))?;

        let to = parse_address(to_address).ok_or_else(|| SubmissionError::InvalidAddress(to_address.to_string()))?;
        let value = parse_amount(amount_eth)?;

        let nonce = chain
            .get_transaction_count(wallet.address())
            .await
            .map_err(SubmissionError::from)?;
        let gas_price = match self.gas_price_override {
            Some(price) => price,
            None => chain.gas_price().await.map_err(SubmissionError::from)?,
        };
        let chain_id = chain.chain_id().await.map_err(SubmissionError::from)?;

        let signed = wallet.sign_transfer(&TransferRequest {
            chain_id,
            nonce,
            gas_price,
            gas_limit: config::chain::TRANSFER_GAS_LIMIT,
            to,
            value,
        })?;

        let hash = chain
            .send_raw_transaction(&signed.raw)
            .await
            .map_err(SubmissionError::from)?;
        if hash != signed.hash {
            log::warn!(
                "Node reported tx hash {} but locally computed {} (chat {})",
                hash,
                signed.hash,
                chat_id
            );
        }

        log::info!(
            "Payment submitted: chat={} from={} to={} value_wei={} nonce={} tx={}",
            chat_id,
            wallet.address(),
            to,
            value,
            nonce,
            hash
        );
        Ok(format!("{:#x}", hash))
    }
}

/// Accepts `0x`-prefixed 20-byte hex. Single-case input is taken as is;
/// mixed case must carry a valid EIP-55 checksum.
fn parse_address(raw: &str) -> Option<Address> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))?;
    let normalized = format!("0x{}", digits);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(&normalized, None).ok()
    } else {
        normalized.parse::<Address>().ok()
    }
}

fn parse_amount(raw: &str) -> Result<U256, SubmissionError> {
    let invalid = |reason: &str| SubmissionError::InvalidAmount {
        amount: raw.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(invalid("amount is negative"));
    }
    let wei = parse_ether(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if wei.is_zero() {
        return Err(invalid("amount is zero"));
    }
    Ok(wei)
}

/// `1.500000000000000000` → `1.5`, `2.000000000000000000` → `2`.
pub fn format_ether_trimmed(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return formatted;
    }
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}

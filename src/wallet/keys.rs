//! secp256k1 key pairs, Ethereum address derivation and local signing

use std::fmt;

use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_primitives::{keccak256, Address, Bytes, PrimitiveSignature, TxKind, B256, U256};
use k256::ecdsa::{signature::hazmat::PrehashSigner, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

use crate::core::error::SubmissionError;

/// A chat's custodial wallet.
///
/// The private key is hex without `0x`, wrapped so it never shows up in
/// `Debug` output or logs.
#[derive(Clone)]
pub struct Wallet {
    address: Address,
    private_key: SecretString,
}

/// Transfer parameters for [`Wallet::sign_transfer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
}

/// An RLP-encoded signed transaction, ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub raw: Vec<u8>,
    pub hash: B256,
}

impl Wallet {
    /// Generates a fresh key pair from the OS random source.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        Self::from_signing_key(&signing_key)
    }

    /// Restores a wallet from a hex private key (with or without `0x`).
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, SubmissionError> {
        let signing_key = parse_signing_key(private_key)?;
        Ok(Self::from_signing_key(&signing_key))
    }

    fn from_signing_key(signing_key: &SigningKey) -> Self {
        Self {
            address: address_of(signing_key),
            private_key: SecretString::from(hex::encode(signing_key.to_bytes())),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed `0x…` form, as shown to the chat.
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Signs a legacy EIP-155 value transfer with the held key.
    pub fn sign_transfer(&self, request: &TransferRequest) -> Result<SignedTransfer, SubmissionError> {
        let signing_key = parse_signing_key(self.private_key.expose_secret())?;

        let tx = TxLegacy {
            chain_id: Some(request.chain_id),
            nonce: request.nonce,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            to: TxKind::Call(request.to),
            value: request.value,
            input: Bytes::new(),
        };

        let signature = sign_hash(&signing_key, tx.signature_hash())?;
        let signed = tx.into_signed(signature);

        let mut raw = Vec::new();
        signed.rlp_encode(&mut raw);

        Ok(SignedTransfer {
            hash: *signed.hash(),
            raw,
        })
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

fn parse_signing_key(private_key: &str) -> Result<SigningKey, SubmissionError> {
    let trimmed = private_key.trim();
    let hex_key = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_key).map_err(|e| SubmissionError::Signing(format!("private key is not hex: {}", e)))?;
    SigningKey::from_slice(&bytes).map_err(|e| SubmissionError::Signing(format!("invalid private key: {}", e)))
}

fn sign_hash(signing_key: &SigningKey, hash: B256) -> Result<PrimitiveSignature, SubmissionError> {
    let (sig, recovery_id) = signing_key
        .sign_prehash(hash.as_ref())
        .map_err(|e| SubmissionError::Signing(e.to_string()))?;
    let r = U256::from_be_slice(&sig.r().to_bytes());
    let s = U256::from_be_slice(&sig.s().to_bytes());
    Ok(PrimitiveSignature::new(r, s, recovery_id.is_y_odd()))
}

/// keccak256 of the uncompressed public key, last 20 bytes.
fn address_of(signing_key: &SigningKey) -> Address {
    let verifying_key = VerifyingKey::from(signing_key);
    let public_key = verifying_key.to_encoded_point(false);
    // Skip the 0x04 prefix
    let hash = keccak256(&public_key.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

//! Custodial Ethereum wallets: key handling, chain RPC and the payment service

pub mod chain;
pub mod keys;
pub mod service;

pub use chain::{ChainClient, JsonRpcChainClient};
pub use keys::{SignedTransfer, TransferRequest, Wallet};
pub use service::WalletService;

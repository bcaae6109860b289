//! Marketbot - Telegram marketplace bot driven by webhooks
//!
//! Relays chat commands to the Bot API, walks sellers through product
//! registration and keeps one custodial Ethereum wallet per chat.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, metrics and the webhook server
//! - `storage`: session, wallet and dedup stores plus per-chat locks
//! - `marketplace`: product catalog and the registration state machine
//! - `wallet`: key handling, JSON-RPC chain client and the payment service
//! - `telegram`: update processing, routing, outbound messages, Bot API setup

pub mod cli;
pub mod core;
pub mod marketplace;
pub mod storage;
pub mod telegram;
pub mod wallet;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, Config};
pub use telegram::{HandlerDeps, UpdateProcessor, WebhookOutcome, WebhookStatus};
pub use wallet::WalletService;

//! Telegram webhook handling and Bot API access

pub mod bot;
pub mod handlers;
pub mod messages;
pub mod notifier;
pub mod router;

// Re-exports for convenience
pub use handlers::{HandlerDeps, UpdateProcessor, WebhookOutcome, WebhookStatus};
pub use notifier::{Notifier, TelegramNotifier};
pub use router::{Action, CommandRouter};

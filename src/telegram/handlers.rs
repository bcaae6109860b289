//! Webhook update processing
//!
//! This module turns one inbound update into at most one outbound reply:
//! dedup check, per-chat lock, routing, the action itself, then delivery.
//! Every path ends in a [`WebhookOutcome`]; nothing escapes as an HTTP error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::core::config::{Config, RegistrationInterrupt};
use crate::core::error::{AppError, AppResult, ConfigError, WalletError};
use crate::core::metrics;
use crate::marketplace::{Catalog, RegistrationStep, Transition};
use crate::storage::{
    ChatLocks, MemorySessionStore, MemoryUpdateLedger, MemoryWalletStore, SessionStore, UpdateLedger,
};
use crate::telegram::messages;
use crate::telegram::notifier::Notifier;
use crate::telegram::router::{Action, CommandRouter};
use crate::wallet::{ChainClient, WalletService};

/// Inbound update. Only the fields the bot acts on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    pub update_id: Option<i64>,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingMessage {
    pub chat: Option<IncomingChat>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingChat {
    pub id: i64,
}

/// Result category reported in the webhook response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WebhookStatus {
    Success,
    Duplicate,
    Ignored,
    Rejected,
    DeliveryFailed,
    ConfigError,
}

/// JSON body returned for every webhook call (always with HTTP 200).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookOutcome {
    pub status: WebhookStatus,
    pub message: String,
}

impl WebhookOutcome {
    pub fn new(status: WebhookStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Maps a processing error to its acknowledgement, logging it at the
    /// level it deserves.
    fn from_error(err: &AppError) -> Self {
        match err {
            AppError::DuplicateUpdate(id) => {
                log::info!("Skipping duplicate update {}", id);
                Self::new(WebhookStatus::Duplicate, "Update already processed")
            }
            AppError::MalformedInput(reason) => {
                log::warn!("Rejected update: {}", reason);
                Self::new(WebhookStatus::Rejected, "Malformed update")
            }
            AppError::Json(e) => {
                log::warn!("Rejected update with invalid JSON: {}", e);
                Self::new(WebhookStatus::Rejected, "Invalid JSON format")
            }
            AppError::Config(e) => {
                log::error!("❌ Cannot handle update: {}", e);
                Self::new(WebhookStatus::ConfigError, "Bot token not configured")
            }
            AppError::DeliveryFailure(reason) => {
                log::warn!("Reply not delivered: {}", reason);
                Self::new(WebhookStatus::DeliveryFailed, "Failed to send message")
            }
            other => {
                log::error!("Unexpected error while handling update: {}", other);
                Self::new(WebhookStatus::Rejected, "Processing error")
            }
        }
    }
}

/// Dependencies required by the processor
#[derive(Clone)]
pub struct HandlerDeps {
    pub ledger: Arc<dyn UpdateLedger>,
    pub sessions: Arc<dyn SessionStore>,
    pub wallets: WalletService,
    pub catalog: Catalog,
    /// `None` when no bot token is configured
    pub notifier: Option<Arc<dyn Notifier>>,
    pub interrupt: RegistrationInterrupt,
}

impl HandlerDeps {
    /// In-memory stores sized from `config`.
    pub fn in_memory(
        config: &Config,
        notifier: Option<Arc<dyn Notifier>>,
        chain: Option<Arc<dyn ChainClient>>,
    ) -> Self {
        let wallets = WalletService::new(Arc::new(MemoryWalletStore::new()), chain)
            .with_gas_price_gwei(config.gas_price_gwei);
        Self {
            ledger: Arc::new(MemoryUpdateLedger::new(config.dedup_ttl, config.dedup_max_entries)),
            sessions: Arc::new(MemorySessionStore::new(config.session_ttl)),
            wallets,
            catalog: Catalog::default(),
            notifier,
            interrupt: config.registration_interrupt,
        }
    }
}

/// Processes webhook updates. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct UpdateProcessor {
    deps: HandlerDeps,
    router: CommandRouter,
    locks: ChatLocks,
}

impl UpdateProcessor {
    pub fn new(deps: HandlerDeps) -> Self {
        let router = CommandRouter::new(Arc::clone(&deps.sessions));
        Self {
            deps,
            router,
            locks: ChatLocks::new(),
        }
    }

    /// Handles a raw webhook body.
    pub async fn process_raw(&self, body: &[u8]) -> WebhookOutcome {
        let result = serde_json::from_slice::<Update>(body).map_err(AppError::from);
        match result {
            Ok(update) => self.process(update).await,
            Err(e) => Self::finish(Err(e)),
        }
    }

    /// Handles a decoded update.
    pub async fn process(&self, update: Update) -> WebhookOutcome {
        Self::finish(self.try_process(update).await)
    }

    fn finish(result: AppResult<WebhookOutcome>) -> WebhookOutcome {
        let outcome = result.unwrap_or_else(|e| WebhookOutcome::from_error(&e));
        metrics::record_update(outcome.status.as_ref());
        outcome
    }

    async fn try_process(&self, update: Update) -> AppResult<WebhookOutcome> {
        if let Some(update_id) = update.update_id {
            if !self.deps.ledger.mark_if_new(update_id).await {
                return Err(AppError::DuplicateUpdate(update_id));
            }
        }

        let Some(message) = update.message else {
            log::debug!("Update {:?} carries no message", update.update_id);
            return Ok(WebhookOutcome::new(WebhookStatus::Ignored, "Update processed"));
        };

        let chat_id = message
            .chat
            .map(|chat| chat.id)
            .ok_or_else(|| AppError::MalformedInput("message without chat id".to_string()))?;

        let notifier = self
            .deps
            .notifier
            .as_ref()
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let text = message.text.unwrap_or_default();

        // Held until the reply is out so a chat's replies keep their order
        let _guard = self.locks.lock(chat_id).await;

        let action = self.router.route(chat_id, &text).await;
        log::info!("Chat {}: {}", chat_id, action.name());
        self.apply_interrupt_policy(chat_id, &action).await;

        let reply = self.execute(chat_id, action).await;
        if notifier.send(chat_id, &reply).await {
            Ok(WebhookOutcome::new(WebhookStatus::Success, "Message sent"))
        } else {
            Err(AppError::DeliveryFailure(format!("sendMessage to chat {} failed", chat_id)))
        }
    }

    /// Under [`RegistrationInterrupt::Cancel`] any command other than `/sell`
    /// and `/cancel` drops an active registration before running.
    async fn apply_interrupt_policy(&self, chat_id: i64, action: &Action) {
        if self.deps.interrupt != RegistrationInterrupt::Cancel || !action.is_command() {
            return;
        }
        if matches!(action, Action::StartRegistration | Action::CancelRegistration) {
            return;
        }
        if let Some(step) = self.deps.sessions.delete(chat_id).await {
            log::info!("Chat {}: registration abandoned at {} by {}", chat_id, step, action.name());
        }
    }

    async fn execute(&self, chat_id: i64, action: Action) -> String {
        match action {
            Action::SendStatic(text) => text,
            Action::StartRegistration => {
                let (step, prompt) = RegistrationStep::start();
                self.deps.sessions.set(chat_id, step).await;
                prompt.to_string()
            }
            Action::ContinueRegistration(answer) => self.continue_registration(chat_id, &answer).await,
            Action::CancelRegistration => match self.deps.sessions.delete(chat_id).await {
                Some(_) => messages::REGISTRATION_CANCELLED.to_string(),
                None => messages::NO_REGISTRATION.to_string(),
            },
            Action::ListProducts => self.deps.catalog.render_list(),
            Action::SearchProducts(keyword) => self.deps.catalog.render_search(&keyword),
            Action::ShowWallet => {
                let address = self.deps.wallets.create_or_get_wallet(chat_id).await;
                messages::wallet_address(&address)
            }
            Action::ShowBalance => self.show_balance(chat_id).await,
            Action::Pay { to, amount } => self.pay(chat_id, &to, &amount).await,
            Action::Unknown(text) => messages::unknown_command(&text),
        }
    }

    async fn continue_registration(&self, chat_id: i64, answer: &str) -> String {
        // Routed under the same lock, so only idle expiry can get here first
        let Some(step) = self.deps.sessions.get(chat_id).await else {
            return messages::unknown_command(answer);
        };

        match step.advance(answer) {
            Transition::Next { step, prompt } => {
                self.deps.sessions.set(chat_id, step).await;
                prompt.to_string()
            }
            Transition::Complete(product) => {
                self.deps.sessions.delete(chat_id).await;
                metrics::record_registration_completed();
                log::info!("Chat {}: registered product {:?}", chat_id, product.name);
                product.summary()
            }
        }
    }

    async fn show_balance(&self, chat_id: i64) -> String {
        if !self.deps.wallets.chain_configured() {
            return messages::CHAIN_NOT_CONFIGURED.to_string();
        }

        let address = self.deps.wallets.create_or_get_wallet(chat_id).await;
        match self.deps.wallets.get_balance(&address).await {
            Ok(ether) => messages::balance(&ether),
            Err(e) => {
                log::warn!("Balance lookup failed for chat {}: {}", chat_id, e);
                messages::BALANCE_FAILED.to_string()
            }
        }
    }

    async fn pay(&self, chat_id: i64, to: &str, amount: &str) -> String {
        match self.deps.wallets.send_payment(chat_id, to, amount).await {
            Ok(tx_hash) => messages::payment_sent(&tx_hash),
            Err(e) => {
                match &e {
                    WalletError::NoWallet(_) | WalletError::ChainUnavailable => {
                        log::info!("Payment refused for chat {}: {}", chat_id, e)
                    }
                    _ => log::warn!("Payment failed for chat {}: {}", chat_id, e),
                }
                messages::PAYMENT_FAILED.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(i64, String)>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn texts(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, chat_id: i64, text: &str) -> bool {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
            !self.fail
        }
    }

    fn processor_with(config: &Config, notifier: Arc<RecordingNotifier>) -> UpdateProcessor {
        let notifier: Arc<dyn Notifier> = notifier;
        UpdateProcessor::new(HandlerDeps::in_memory(config, Some(notifier), None))
    }

    fn message(update_id: Option<i64>, chat_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(IncomingMessage {
                chat: Some(IncomingChat { id: chat_id }),
                text: Some(text.to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_sell_flow_through_processor() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        for text in ["/sell", "Widget", "1000", "Like new", "Seoul"] {
            let outcome = processor.process(message(None, 1, text)).await;
            assert_eq!(outcome.status, WebhookStatus::Success);
        }

        let texts = notifier.texts();
        assert_eq!(texts.len(), 5);
        assert_eq!(texts[0], messages::REGISTRATION_START);
        assert_eq!(texts[1], messages::PROMPT_PRICE);
        assert!(texts[4].contains("상품명: Widget"));
        assert!(processor.deps.sessions.get(1).await.is_none());
    }

    #[tokio::test]
    async fn test_keep_policy_preserves_session() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        processor.process(message(None, 1, "/sell")).await;
        processor.process(message(None, 1, "/products")).await;
        assert_eq!(processor.deps.sessions.get(1).await, Some(RegistrationStep::AwaitingName));

        processor.process(message(None, 1, "Widget")).await;
        assert_eq!(notifier.texts().last().map(String::as_str), Some(messages::PROMPT_PRICE));
    }

    #[tokio::test]
    async fn test_sell_mid_registration_restarts_from_name() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        for text in ["/sell", "Widget", "/sell", "Gadget"] {
            let outcome = processor.process(message(None, 1, text)).await;
            assert_eq!(outcome.status, WebhookStatus::Success);
        }

        let texts = notifier.texts();
        assert_eq!(texts[2], messages::REGISTRATION_START);
        assert_eq!(texts[3], "가격을 입력해주세요.");
        assert_eq!(
            processor.deps.sessions.get(1).await,
            Some(RegistrationStep::AwaitingPrice {
                name: "Gadget".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_policy_drops_session() {
        let notifier = Arc::new(RecordingNotifier::default());
        let config = Config {
            registration_interrupt: RegistrationInterrupt::Cancel,
            ..Config::default()
        };
        let processor = processor_with(&config, notifier.clone());

        processor.process(message(None, 1, "/sell")).await;
        processor.process(message(None, 1, "/products")).await;
        assert_eq!(processor.deps.sessions.get(1).await, None);
        assert!(notifier.texts()[1].starts_with(messages::PRODUCTS_HEADER));
    }

    #[tokio::test]
    async fn test_cancel_command() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        processor.process(message(None, 1, "/cancel")).await;
        processor.process(message(None, 1, "/sell")).await;
        processor.process(message(None, 1, "/cancel")).await;

        let texts = notifier.texts();
        assert_eq!(texts[0], messages::NO_REGISTRATION);
        assert_eq!(texts[2], messages::REGISTRATION_CANCELLED);
        assert_eq!(processor.deps.sessions.get(1).await, None);
    }

    #[tokio::test]
    async fn test_duplicate_update_sends_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        let first = processor.process(message(Some(7), 1, "/help")).await;
        let second = processor.process(message(Some(7), 1, "/help")).await;

        assert_eq!(first.status, WebhookStatus::Success);
        assert_eq!(second.status, WebhookStatus::Duplicate);
        assert_eq!(notifier.texts().len(), 1);
    }

    #[tokio::test]
    async fn test_non_message_update_is_ignored() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        let outcome = processor.process_raw(br#"{"update_id": 3, "edited_message": {}}"#).await;
        assert_eq!(outcome.status, WebhookStatus::Ignored);
        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_updates_are_rejected() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        assert_eq!(processor.process_raw(b"not json").await.status, WebhookStatus::Rejected);
        assert_eq!(
            processor.process_raw(br#"{"message": {"text": "/help"}}"#).await.status,
            WebhookStatus::Rejected
        );
        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_is_config_error() {
        let processor = UpdateProcessor::new(HandlerDeps::in_memory(&Config::default(), None, None));
        let outcome = processor.process(message(None, 1, "/help")).await;
        assert_eq!(outcome.status, WebhookStatus::ConfigError);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let processor = processor_with(&Config::default(), notifier);
        let outcome = processor.process(message(None, 1, "/help")).await;
        assert_eq!(outcome.status, WebhookStatus::DeliveryFailed);
    }

    #[tokio::test]
    async fn test_message_without_text_is_empty_text() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        processor.process_raw(br#"{"message": {"chat": {"id": 5}}}"#).await;
        assert_eq!(notifier.texts(), vec![messages::unknown_command("")]);
    }

    #[tokio::test]
    async fn test_wallet_commands_without_chain() {
        let notifier = Arc::new(RecordingNotifier::default());
        let processor = processor_with(&Config::default(), notifier.clone());

        processor.process(message(None, 1, "/wallet")).await;
        processor.process(message(None, 1, "/balance")).await;
        processor
            .process(message(None, 1, "/pay 0x0000000000000000000000000000000000000001 1"))
            .await;

        let texts = notifier.texts();
        assert!(texts[0].starts_with("지갑 주소: 0x"));
        assert_eq!(texts[1], messages::CHAIN_NOT_CONFIGURED);
        assert_eq!(texts[2], messages::PAYMENT_FAILED);
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let outcome = WebhookOutcome::new(WebhookStatus::DeliveryFailed, "x");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"status": "delivery_failed", "message": "x"}));
        assert_eq!(WebhookStatus::ConfigError.as_ref(), "config_error");
    }
}

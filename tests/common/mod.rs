//! Common test utilities
//!
//! This module is shared across all integration tests. `TestEnvironment`
//! wires an [`UpdateProcessor`] to a wiremock Bot API, and optionally to a
//! wiremock JSON-RPC node.

#![allow(dead_code)]

use std::sync::Arc;

use marketbot::core::config::{Config, RegistrationInterrupt};
use marketbot::telegram::{HandlerDeps, Notifier, TelegramNotifier, UpdateProcessor};
use marketbot::wallet::{ChainClient, JsonRpcChainClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_TOKEN: &str = "123456:TEST";
pub const TEST_CHAT_ID: i64 = 123456789;

/// Complete test environment for webhook tests
pub struct TestEnvironment {
    /// Mock Bot API
    pub telegram: MockServer,
    /// Mock JSON-RPC node, when the chain is enabled
    pub chain: Option<MockServer>,
    pub processor: UpdateProcessor,
}

impl TestEnvironment {
    /// Bot API accepts every message; no chain endpoint.
    pub async fn new() -> Self {
        Self::build(RegistrationInterrupt::Keep, false).await
    }

    /// Bot API accepts every message; a JSON-RPC mock is attached but has no
    /// methods mounted yet.
    pub async fn with_chain() -> Self {
        Self::build(RegistrationInterrupt::Keep, true).await
    }

    pub async fn with_interrupt(interrupt: RegistrationInterrupt) -> Self {
        Self::build(interrupt, false).await
    }

    async fn build(interrupt: RegistrationInterrupt, with_chain: bool) -> Self {
        let telegram = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/bot{}/sendMessage", TEST_TOKEN)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .mount(&telegram)
            .await;

        let chain_server = if with_chain {
            Some(MockServer::start().await)
        } else {
            None
        };

        let config = Config {
            bot_token: Some(TEST_TOKEN.to_string().into()),
            bot_api_url: telegram.uri(),
            rpc_url: chain_server.as_ref().map(|s| s.uri()),
            registration_interrupt: interrupt,
            ..Config::default()
        };

        let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::from_config(&config).unwrap());
        let chain: Option<Arc<dyn ChainClient>> = config
            .rpc_url
            .as_ref()
            .map(|url| Arc::new(JsonRpcChainClient::new(url.clone()).unwrap()) as Arc<dyn ChainClient>);

        let processor = UpdateProcessor::new(HandlerDeps::in_memory(&config, Some(notifier), chain));

        Self {
            telegram,
            chain: chain_server,
            processor,
        }
    }

    /// Texts delivered through sendMessage, in order.
    pub async fn sent_texts(&self) -> Vec<String> {
        sent_messages(&self.telegram)
            .await
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    /// Sends a text message from `chat_id` through the processor.
    pub async fn say(&self, chat_id: i64, text: &str) -> marketbot::WebhookOutcome {
        let body = message_update(None, chat_id, text).to_string();
        self.processor.process_raw(body.as_bytes()).await
    }
}

/// `(chat_id, text)` for every sendMessage the server received.
pub async fn sent_messages(server: &MockServer) -> Vec<(String, String)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path().ends_with("/sendMessage"))
        .map(|request| {
            let mut chat_id = String::new();
            let mut text = String::new();
            for (key, value) in url::form_urlencoded::parse(&request.body) {
                match key.as_ref() {
                    "chat_id" => chat_id = value.into_owned(),
                    "text" => text = value.into_owned(),
                    _ => {}
                }
            }
            (chat_id, text)
        })
        .collect()
}

/// Telegram-shaped update JSON.
pub fn message_update(update_id: Option<i64>, chat_id: i64, text: &str) -> Value {
    let mut update = json!({
        "message": {
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": {"id": chat_id, "type": "private"},
            "text": text,
        }
    });
    if let Some(id) = update_id {
        update["update_id"] = json!(id);
    }
    update
}

/// Successful JSON-RPC response body.
pub fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result}))
}

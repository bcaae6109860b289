//! Maps inbound chat text to an [`Action`].
//!
//! Commands are recognised first, whatever the chat's registration state.
//! Everything else is either a registration answer or an unknown command.

use std::sync::Arc;

use crate::storage::SessionStore;
use crate::telegram::messages;

/// What the processor should do with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Reply with fixed text
    SendStatic(String),
    StartRegistration,
    /// Feed the text into the chat's registration as the current answer
    ContinueRegistration(String),
    CancelRegistration,
    ListProducts,
    SearchProducts(String),
    ShowWallet,
    ShowBalance,
    Pay { to: String, amount: String },
    /// Not a command and no registration to feed
    Unknown(String),
}

impl Action {
    /// True for everything recognised from the command table.
    pub fn is_command(&self) -> bool {
        !matches!(self, Action::ContinueRegistration(_) | Action::Unknown(_))
    }

    /// Label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::SendStatic(_) => "static",
            Action::StartRegistration => "sell",
            Action::ContinueRegistration(_) => "registration_answer",
            Action::CancelRegistration => "cancel",
            Action::ListProducts => "products",
            Action::SearchProducts(_) => "search",
            Action::ShowWallet => "wallet",
            Action::ShowBalance => "balance",
            Action::Pay { .. } => "pay",
            Action::Unknown(_) => "unknown",
        }
    }
}

/// Parses `text` against the command table, ignoring session state.
///
/// Returns `None` when the text is not a command.
pub fn parse_command(text: &str) -> Option<Action> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?;
    let args: Vec<&str> = tokens.collect();

    // "/start@MarketBot" addresses this bot in group chats
    let command = head.split('@').next().unwrap_or(head).to_lowercase();

    let no_args = |action: Action| if args.is_empty() { Some(action) } else { None };

    match command.as_str() {
        "/start" => no_args(Action::SendStatic(messages::START.to_string())),
        "/help" => no_args(Action::SendStatic(messages::HELP.to_string())),
        "/products" => no_args(Action::ListProducts),
        "/sell" => no_args(Action::StartRegistration),
        "/cancel" => no_args(Action::CancelRegistration),
        "/wallet" => no_args(Action::ShowWallet),
        "/balance" => no_args(Action::ShowBalance),
        "/search" => {
            if args.is_empty() {
                Some(Action::SendStatic(messages::SEARCH_USAGE.to_string()))
            } else {
                Some(Action::SearchProducts(args.join(" ")))
            }
        }
        "/pay" => match args.as_slice() {
            [to, amount] => Some(Action::Pay {
                to: (*to).to_string(),
                amount: (*amount).to_string(),
            }),
            _ => Some(Action::SendStatic(messages::PAY_USAGE.to_string())),
        },
        _ => None,
    }
}

/// Session-aware router.
#[derive(Clone)]
pub struct CommandRouter {
    sessions: Arc<dyn SessionStore>,
}

impl CommandRouter {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn route(&self, chat_id: i64, text: &str) -> Action {
        if let Some(action) = parse_command(text) {
            return action;
        }

        if self.sessions.get(chat_id).await.is_some() {
            Action::ContinueRegistration(text.to_string())
        } else {
            Action::Unknown(text.to_string())
        }
    }
}

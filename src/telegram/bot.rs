//! Bot API setup through teloxide
//!
//! This module contains:
//! - Command enum used for the Telegram command menu
//! - Bot instance creation
//! - Webhook registration

use reqwest::ClientBuilder;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, Config};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "사용 가능한 명령어:")]
pub enum Command {
    #[command(description = "봇 시작")]
    Start,
    #[command(description = "도움말")]
    Help,
    #[command(description = "상품 목록")]
    Products,
    #[command(description = "상품 검색 (/search <키워드>)")]
    Search,
    #[command(description = "상품 등록")]
    Sell,
    #[command(description = "상품 등록 취소")]
    Cancel,
    #[command(description = "지갑 주소 확인")]
    Wallet,
    #[command(description = "지갑 잔액 조회")]
    Balance,
    #[command(description = "ETH 전송 (/pay <주소> <ETH 금액>)")]
    Pay,
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token or invalid BOT_API_URL
pub fn create_bot(config: &Config) -> anyhow::Result<Bot> {
    let token = config.require_bot_token()?;
    let client = ClientBuilder::new()
        .timeout(config::network::message_timeout())
        .build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    if config.bot_api_url == config::network::DEFAULT_BOT_API_URL {
        return Ok(bot);
    }

    log::info!("Using custom Bot API URL: {}", config.bot_api_url);
    let url = url::Url::parse(&config.bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
    Ok(bot.set_api_url(url))
}

/// Menu entries shown by Telegram clients, in display order.
///
/// `setMyCommands` takes bare names, so the `/` prefix teloxide adds is removed.
pub fn menu_commands() -> Vec<BotCommand> {
    Command::bot_commands()
        .into_iter()
        .map(|entry| BotCommand::new(entry.command.trim_start_matches('/'), entry.description))
        .collect()
}

/// Sets up bot commands in Telegram UI
///
/// # Returns
/// * `Ok(())` - Commands set successfully
/// * `Err(RequestError)` - Failed to set commands
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(menu_commands()).await?;
    Ok(())
}

/// Points Telegram's update delivery at `webhook_url`.
pub async fn register_webhook(bot: &Bot, webhook_url: &str) -> anyhow::Result<()> {
    let url = url::Url::parse(webhook_url).map_err(|e| anyhow::anyhow!("Invalid WEBHOOK_URL: {}", e))?;
    bot.set_webhook(url).await?;
    log::info!("✅ Webhook registered: {}", crate::core::logging::redact_url(webhook_url));
    Ok(())
}

//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the bot token, chain endpoint and webhook URL

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to create the file or a logger was already set
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which features are usable with the loaded configuration.
///
/// Secrets are never printed, only whether they are present.
pub fn log_startup_configuration(config: &config::Config) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🛒 Marketplace bot configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if config.bot_token.is_some() {
        log::info!("✅ Bot token: set");
    } else {
        log::error!("❌ TELEGRAM_BOT_TOKEN: not set");
        log::error!("   Updates will be acknowledged but no replies can be sent!");
    }
    log::info!("   Bot API: {}", config.bot_api_url);

    match config.rpc_url {
        Some(ref url) => {
            log::info!("✅ Chain endpoint: {}", redact_url(url));
            match config.gas_price_gwei {
                Some(gwei) => log::info!("   Gas price: fixed {} gwei", gwei),
                None => log::info!("   Gas price: eth_gasPrice"),
            }
        }
        None => {
            log::warn!("⚠️  WEB3_PROVIDER_URI: not set");
            log::warn!("   /balance and /pay will answer that configuration is required");
        }
    }

    match config.webhook_url {
        Some(ref url) => log::info!("✅ Webhook URL: {}", redact_url(url)),
        None => log::warn!("⚠️  WEBHOOK_URL: not set (webhook must be registered manually)"),
    }

    log::info!("   Registration interrupt policy: {}", config.registration_interrupt);
    log::info!(
        "   Session TTL: {}s, dedup TTL: {}s, dedup capacity: {}",
        config.session_ttl.as_secs(),
        config.dedup_ttl.as_secs(),
        config.dedup_max_entries
    );
    log::warn!("⚠️  Sessions and wallets live in process memory and are lost on restart");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Strips everything after the host from an RPC URL.
///
/// Hosted providers put the API key in the path or query string.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port() {
                Some(port) => format!("{}://{}:{}/…", parsed.scheme(), host, port),
                None => format!("{}://{}/…", parsed.scheme(), host),
            },
            None => "<unparseable url>".to_string(),
        },
        Err(_) => "<unparseable url>".to_string(),
    }
}

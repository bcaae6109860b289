use secrecy::SecretString;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display, EnumString};

use crate::core::error::ConfigError;

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for a single sendMessage call (in seconds)
    pub const MESSAGE_TIMEOUT_SECS: u64 = 15;

    /// Timeout for a single JSON-RPC call to the chain endpoint (in seconds)
    pub const RPC_TIMEOUT_SECS: u64 = 10;

    /// Default Bot API base URL
    pub const DEFAULT_BOT_API_URL: &str = "https://api.telegram.org";

    pub fn message_timeout() -> Duration {
        Duration::from_secs(MESSAGE_TIMEOUT_SECS)
    }

    pub fn rpc_timeout() -> Duration {
        Duration::from_secs(RPC_TIMEOUT_SECS)
    }
}

/// Chain / payment configuration
pub mod chain {
    /// Gas limit of a plain value transfer
    pub const TRANSFER_GAS_LIMIT: u64 = 21_000;
}

/// Registration session configuration
pub mod registration {
    /// Idle time after which an unfinished registration is dropped
    /// Default: 3600 seconds (1 hour)
    pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
}

/// Webhook deduplication configuration
pub mod dedup {
    /// How long an update id is remembered
    /// Telegram gives up redelivering after about a day
    pub const DEFAULT_TTL_SECS: u64 = 86_400;

    /// Upper bound on remembered update ids
    pub const DEFAULT_MAX_ENTRIES: u64 = 100_000;
}

/// Web server configuration
pub mod web {
    /// Default port for the webhook listener
    pub const DEFAULT_PORT: u16 = 3000;
}

/// What happens to an in-progress registration when the chat sends a command.
///
/// Commands are always executed; the policy only decides the session's fate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RegistrationInterrupt {
    /// Run the command, keep waiting for the current step's answer
    #[default]
    Keep,
    /// Run the command and abandon the registration
    Cancel,
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token
    /// Read from TELEGRAM_BOT_TOKEN or BOT_TOKEN environment variable
    pub bot_token: Option<SecretString>,
    /// Bot API base URL (BOT_API_URL), for a local Bot API server or tests
    pub bot_api_url: String,
    /// Ethereum JSON-RPC endpoint (WEB3_PROVIDER_URI or RPC_URL)
    /// None disables /balance and /pay
    pub rpc_url: Option<String>,
    /// Fixed gas price in gwei (GAS_PRICE_GWEI); None asks the node
    pub gas_price_gwei: Option<u64>,
    /// Public URL Telegram should post updates to (WEBHOOK_URL)
    pub webhook_url: Option<String>,
    /// Listener port (WEB_PORT)
    pub web_port: u16,
    /// Log file path (LOG_FILE_PATH)
    pub log_file_path: String,
    pub registration_interrupt: RegistrationInterrupt,
    pub session_ttl: Duration,
    pub dedup_ttl: Duration,
    pub dedup_max_entries: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            bot_api_url: network::DEFAULT_BOT_API_URL.to_string(),
            rpc_url: None,
            gas_price_gwei: None,
            webhook_url: None,
            web_port: web::DEFAULT_PORT,
            log_file_path: "app.log".to_string(),
            registration_interrupt: RegistrationInterrupt::default(),
            session_ttl: Duration::from_secs(registration::DEFAULT_SESSION_TTL_SECS),
            dedup_ttl: Duration::from_secs(dedup::DEFAULT_TTL_SECS),
            dedup_max_entries: dedup::DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads configuration through an arbitrary lookup (used by tests).
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let defaults = Self::default();

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .map(SecretString::from);
        let bot_api_url = get("BOT_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.bot_api_url);
        let rpc_url = get("WEB3_PROVIDER_URI").or_else(|| get("RPC_URL"));

        Ok(Self {
            bot_token,
            bot_api_url,
            rpc_url,
            gas_price_gwei: parse_opt("GAS_PRICE_GWEI", get("GAS_PRICE_GWEI"))?,
            webhook_url: get("WEBHOOK_URL"),
            web_port: parse_opt("WEB_PORT", get("WEB_PORT"))?.unwrap_or(defaults.web_port),
            log_file_path: get("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
            registration_interrupt: parse_opt("REGISTRATION_INTERRUPT", get("REGISTRATION_INTERRUPT"))?
                .unwrap_or_default(),
            session_ttl: parse_opt("SESSION_TTL_SECS", get("SESSION_TTL_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            dedup_ttl: parse_opt("DEDUP_TTL_SECS", get("DEDUP_TTL_SECS"))?
                .map(Duration::from_secs)
                .unwrap_or(defaults.dedup_ttl),
            dedup_max_entries: parse_opt("DEDUP_MAX_ENTRIES", get("DEDUP_MAX_ENTRIES"))?
                .unwrap_or(defaults.dedup_max_entries),
        })
    }

    /// Returns the bot token or the configuration error that explains its absence.
    pub fn require_bot_token(&self) -> Result<&SecretString, ConfigError> {
        self.bot_token
            .as_ref()
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
    }
}

fn parse_opt<T>(name: &'static str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| ConfigError::Invalid {
            name,
            value: value.clone(),
            reason: e.to_string(),
        })
    })
    .transpose()
}

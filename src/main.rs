use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;

use marketbot::cli::{Cli, Commands};
use marketbot::core::{config::Config, init_logger, log_startup_configuration, metrics, web_server};
use marketbot::telegram::bot::{create_bot, register_webhook, setup_bot_commands};
use marketbot::telegram::{HandlerDeps, Notifier, TelegramNotifier, UpdateProcessor};
use marketbot::wallet::{ChainClient, JsonRpcChainClient, Wallet, WalletService};

/// Main entry point for the marketplace bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging, listener).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?;

    // Initialize logger (console + file)
    init_logger(&config.log_file_path)?;

    match cli.command {
        Some(Commands::Run { port }) => run_bot(config, port).await,
        Some(Commands::SetWebhook { url }) => run_set_webhook(&config, &url).await,
        Some(Commands::Balance { address }) => run_balance(&config, &address).await,
        Some(Commands::NewWallet) => {
            // Address only; the key is dropped with the wallet
            println!("{}", Wallet::generate().address_string());
            Ok(())
        }
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(config, None).await
        }
    }
}

/// Builds the chain client when an endpoint is configured.
fn build_chain(config: &Config) -> Result<Option<Arc<dyn ChainClient>>> {
    match config.rpc_url {
        Some(ref url) => {
            let client: Arc<dyn ChainClient> = Arc::new(JsonRpcChainClient::new(url.clone())?);
            Ok(Some(client))
        }
        None => Ok(None),
    }
}

async fn run_bot(config: Config, port: Option<u16>) -> Result<()> {
    log_startup_configuration(&config);
    metrics::init_metrics();

    let notifier: Option<Arc<dyn Notifier>> = match TelegramNotifier::from_config(&config) {
        Ok(notifier) => Some(Arc::new(notifier)),
        Err(e) => {
            log::error!("❌ Outbound messages disabled: {}", e);
            None
        }
    };

    if config.bot_token.is_some() {
        match create_bot(&config) {
            Ok(bot) => {
                if let Err(e) = setup_bot_commands(&bot).await {
                    log::warn!("Failed to set bot commands: {}", e);
                }
                if let Some(ref webhook_url) = config.webhook_url {
                    if let Err(e) = register_webhook(&bot, webhook_url).await {
                        log::error!("❌ Failed to register webhook: {}", e);
                    }
                }
            }
            Err(e) => log::error!("❌ Failed to create bot: {}", e),
        }
    }

    let chain = build_chain(&config)?;
    let processor = UpdateProcessor::new(HandlerDeps::in_memory(&config, notifier, chain));
    let port = port.unwrap_or(config.web_port);

    tokio::select! {
        result = web_server::start_web_server(port, processor) => result,
        _ = signal::ctrl_c() => {
            log::info!("Shutting down gracefully...");
            Ok(())
        }
    }
}

async fn run_set_webhook(config: &Config, url: &str) -> Result<()> {
    let bot = create_bot(config)?;
    register_webhook(&bot, url).await?;
    setup_bot_commands(&bot).await?;
    println!("Webhook set to {}", url);
    Ok(())
}

async fn run_balance(config: &Config, address: &str) -> Result<()> {
    let chain = build_chain(config)?;
    let wallets = WalletService::new(Arc::new(marketbot::storage::MemoryWalletStore::new()), chain);
    let ether = wallets.get_balance(address).await?;
    println!("{} ETH", ether);
    Ok(())
}

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "marketbot")]
#[command(author, version, about = "Telegram marketplace bot with per-chat Ethereum wallets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the webhook server (default)
    Run {
        /// Listen port (overrides WEB_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Register the webhook URL with Telegram and exit
    SetWebhook {
        /// Public HTTPS URL ending in /webhook
        url: String,
    },

    /// Print the ETH balance of an address using the configured RPC endpoint
    Balance {
        /// 0x-prefixed address
        address: String,
    },

    /// Generate a throwaway key pair and print its address
    NewWallet,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

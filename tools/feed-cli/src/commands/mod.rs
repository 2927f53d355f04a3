//! CLI command implementations.

pub mod browse;
pub mod cart;
pub mod config;

use clap::{Args, Subcommand};

/// Arguments for the browse command.
#[derive(Args)]
pub struct BrowseArgs {
    /// Search term.
    pub term: String,

    /// Pages to load by scrolling.
    #[arg(short, long, default_value = "1")]
    pub pages: u32,

    /// Use the built-in demo catalog instead of the remote service.
    #[arg(long)]
    pub offline: bool,

    /// Download and decode product images.
    #[arg(long)]
    pub images: bool,

    /// Print products as soon as the first batch is revealed.
    #[arg(long)]
    pub no_wait: bool,
}

/// Arguments for the cart-demo command.
#[derive(Args)]
pub struct CartDemoArgs {
    /// Search term to pick products from.
    #[arg(default_value = "shoes")]
    pub term: String,

    /// Use the built-in demo catalog instead of the remote service.
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Output file (`.json` for JSON, anything else TOML).
        #[arg(short, long, default_value = "feed.toml")]
        path: String,

        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}

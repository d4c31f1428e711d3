use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;

use analytics_proxy::analytics::{classify, AnalyticsProxy};
use analytics_proxy::config::Config;
use analytics_proxy::upstream::HttpUpstream;

#[derive(Parser)]
#[command(name = "analytics-proxy-admin")]
#[command(about = "Analytics proxy operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the address a caller IP is forwarded as
    Classify {
        /// Caller IP as it would arrive in X-Forwarded-For
        ip: String,
    },
    /// Fetch the upstream script and print it rewritten
    Script,
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::Classify { ip } => {
            println!("{}", classify(&ip, config.proxy.placeholder()));
        }
        Commands::Script => {
            let upstream = Arc::new(HttpUpstream::new()?);
            let proxy = AnalyticsProxy::new(Arc::new(config.proxy), upstream);
            let response = proxy.fetch_script().await;

            if !response.status.is_success() {
                bail!("upstream script fetch returned {}", response.status);
            }
            std::io::stdout()
                .write_all(response.body_bytes())
                .context("failed to write script to stdout")?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

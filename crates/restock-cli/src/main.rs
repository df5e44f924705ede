mod report;

use clap::{Parser, Subcommand};
use restock_core::SortKey;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "restock-cli")]
#[command(about = "Shopify low-stock and restocking report")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch products and orders and print the restocking report as JSON
    Report {
        /// Override the configured ordering of low-stock items (sku or deficit)
        #[arg(long, value_parser = parse_sort_key)]
        sort: Option<SortKey>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Print the resolved configuration with secrets redacted
    Config,
}

fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = restock_core::load_app_config()?;

    // Logs go to stderr so stdout carries only the report.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report { sort, pretty } => report::run_report(config, sort, pretty).await?,
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use tracing::info;

use arogya::api::ArogyaClient;
use arogya::config::ClientConfig;
use arogya::tui::run_tui;

#[derive(Parser)]
#[command(name = "arogya", about = "Terminal client for the Arogya wellness assistant.")]
struct Cli {
    /// Backend base URL (overrides config file and AROGYA_API_URL)
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arogya=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load();
    let api_url = config.resolve_api_url(cli.api_url.as_deref());

    info!("Arogya client starting against {api_url}");

    run_tui(ArogyaClient::new(api_url)).await
}

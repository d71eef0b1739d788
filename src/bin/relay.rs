use anyhow::{Context, Result};
use maxchat::config::{RelayConfig, load_dotenv};
use maxchat::relay::{self, RelayState};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    init_logging();

    let config = RelayConfig::from_env().context("relay configuration")?;
    let addr = config.listen_addr;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(
        %addr,
        backend = %config.chat_url(),
        authenticated = config.backend_token.is_some(),
        "chat relay listening"
    );
    relay::serve(listener, RelayState::new(config)).await?;
    info!("chat relay stopped");
    Ok(())
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("maxchat=info,maxchat_relay=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

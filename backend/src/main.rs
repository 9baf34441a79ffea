use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vesting_claim::{
    config::Config, router, AppState, Capabilities, RpcLedger, VestingClient, Wallet,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let ledger = Arc::new(RpcLedger::new(
        config.rpc_url.clone(),
        config.commitment,
        config.rpc_retry_window,
    ));
    let client = Arc::new(VestingClient::new(ledger, config.program.clone()));

    let wallet = match &config.keypair_path {
        Some(path) => {
            let wallet = Wallet::from_file(path)?;
            info!(address = %wallet.address(), "👛 wallet loaded");
            Some(wallet)
        }
        None => {
            warn!("no VESTING_KEYPAIR set, lookups and claims are disabled");
            None
        }
    };

    info!(
        rpc = %config.rpc_url,
        program = %config.program.program_id,
        mint = %config.program.mint,
        cluster = %config.program.cluster,
        "⚙️ configuration loaded"
    );

    let state = AppState::new(
        Capabilities {
            client: Some(client),
            wallet,
        },
        config.lookup_debounce,
    );
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Claim service running on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

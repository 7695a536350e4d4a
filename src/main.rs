//! Process entry point: load configuration, wire the service, serve.

use solbalance::config::loader::ConfigLoader;
use solbalance::infrastructure::logging::init_logging;
use solbalance::infrastructure::rate_limit::IpRateLimiter;
use solbalance::infrastructure::shutdown::ShutdownCoordinator;
use solbalance::providers::solana::SolanaRpcClient;
use solbalance::server::build_rocket;
use solbalance::services::balance::BalanceService;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new().load()?;
    init_logging(&config.logging)?;
    info!(
        address = %config.server.address,
        port = config.server.port,
        rpc = %config.rpc.endpoint,
        cache_ttl_secs = config.cache.ttl_secs,
        "starting solbalance"
    );

    let fetcher = Arc::new(SolanaRpcClient::new(&config.rpc)?);
    let service = BalanceService::new(Duration::from_secs(config.cache.ttl_secs), fetcher);
    let limiter = IpRateLimiter::new(&config.rate_limit);

    let coordinator = ShutdownCoordinator::new();
    if limiter.is_enabled() {
        coordinator.spawn(
            "rate-limit sweeper",
            limiter.clone().run_sweeper(coordinator.child_token()),
        );
    }

    build_rocket(&config, service, limiter).launch().await?;

    // rocket has stopped accepting requests; stop the sweeper before exit
    coordinator.shutdown(Duration::from_secs(5)).await;
    info!("solbalance stopped");
    Ok(())
}

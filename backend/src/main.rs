use std::sync::Arc;

use adapters::finnhub::FinnhubWsClient;
use adapters::webhook::WebhookNotifier;
use common::logger::init_logger;
use common::metrics::Counters;
use corelib::AssetClass;
use tickwatch::config::{self, AppConfig};
use tickwatch::runtime::{PipelineConfig, build_engine, spawn_pipeline, spawn_stats_reporter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    init_logger("tickwatch", config::is_production());

    tracing::info!("Starting tickwatch...");

    let cfg = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "invalid configuration; exiting");
    })?;
    tracing::debug!(config = ?cfg, "configuration loaded");

    let counters = Counters::default();

    let engine = Arc::new(build_engine(&cfg));
    tracing::info!(
        equities = engine.registry().count(AssetClass::Equity),
        crypto = engine.registry().count(AssetClass::Crypto),
        equity_threshold_pct = cfg.thresholds.equity_pct,
        crypto_threshold_pct = cfg.thresholds.crypto_pct,
        "instrument registry loaded"
    );

    let feed = Arc::new(
        FinnhubWsClient::new(cfg.finnhub_ws_url.clone(), cfg.finnhub_api_key.clone())
            .with_read_timeout(cfg.feed_read_timeout)
            .with_counters(counters.clone()),
    );
    let notifier = Arc::new(WebhookNotifier::new(cfg.webhook_url.clone())?);

    let pipeline = spawn_pipeline(
        feed,
        notifier,
        engine,
        PipelineConfig::from(&cfg),
        counters.clone(),
    );
    let stats = spawn_stats_reporter(counters, cfg.stats_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    stats.abort();
    pipeline.shutdown();

    Ok(())
}

//! Task wiring.
//!
//! Data flow:
//! Feed → tick channel → AlertDispatcher (engine) → alert channel → notifier

use std::sync::Arc;
use std::time::Duration;

use adapters::finnhub::TickFeed;
use adapters::webhook::{AlertNotifier, run_notifier};
use common::metrics::Counters;
use engine::{AlertDispatcher, AlertEngine, InstrumentRegistry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, error, info, info_span};

use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub tick_queue_capacity: usize,
    pub alert_queue_capacity: usize,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            tick_queue_capacity: cfg.tick_queue_capacity,
            alert_queue_capacity: cfg.alert_queue_capacity,
        }
    }
}

/// Handles of the running pipeline tasks.
pub struct Pipeline {
    pub feed: JoinHandle<()>,
    pub dispatcher: JoinHandle<()>,
    pub notifier: JoinHandle<()>,
}

impl Pipeline {
    pub fn shutdown(self) {
        self.feed.abort();
        self.dispatcher.abort();
        self.notifier.abort();
    }
}

/// Builds the alert engine from the configured instrument lists and thresholds.
pub fn build_engine(cfg: &AppConfig) -> AlertEngine {
    let registry = InstrumentRegistry::new(cfg.equities.iter().cloned(), cfg.crypto.iter().cloned());
    AlertEngine::new(registry, cfg.thresholds)
}

/// Spawns the feed, dispatcher and notifier tasks.
///
/// The feed subscribes to every instrument known to the engine. A feed task
/// that stops is logged; it never takes the process down.
pub fn spawn_pipeline<F, N>(
    feed: Arc<F>,
    notifier: Arc<N>,
    engine: Arc<AlertEngine>,
    cfg: PipelineConfig,
    counters: Counters,
) -> Pipeline
where
    F: TickFeed + ?Sized + 'static,
    N: AlertNotifier + ?Sized + 'static,
{
    let (tick_tx, tick_rx) = mpsc::channel(cfg.tick_queue_capacity);
    let (alert_tx, alert_rx) = mpsc::channel(cfg.alert_queue_capacity);

    let symbols = engine.registry().symbols().to_vec();
    info!(
        instruments = symbols.len(),
        tick_queue = cfg.tick_queue_capacity,
        alert_queue = cfg.alert_queue_capacity,
        "starting pipeline"
    );

    let feed = tokio::spawn(
        async move {
            if let Err(e) = feed.stream_ticks(symbols, tick_tx).await {
                error!(error = ?e, "feed worker stopped");
            }
        }
        .instrument(info_span!("feed_task")),
    );

    let dispatcher = tokio::spawn(
        AlertDispatcher::new(engine, tick_rx, alert_tx, counters.clone())
            .run()
            .instrument(info_span!("dispatcher_task")),
    );

    let notifier = tokio::spawn(
        run_notifier(alert_rx, notifier, counters).instrument(info_span!("notifier_task")),
    );

    Pipeline {
        feed,
        dispatcher,
        notifier,
    }
}

/// Logs a counter snapshot every `every`.
pub fn spawn_stats_reporter(counters: Counters, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // first tick fires immediately

        loop {
            ticker.tick().await;
            let s = counters.snapshot();
            info!(
                ticks = s.ticks_received,
                decode_errors = s.decode_errors,
                alerts = s.alerts_emitted,
                alerts_dropped = s.alerts_dropped,
                deliveries_failed = s.deliveries_failed,
                reconnects = s.reconnects,
                "pipeline stats"
            );
        }
    })
}

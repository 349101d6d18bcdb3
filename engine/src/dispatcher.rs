use std::sync::Arc;

use common::metrics::Counters;
use corelib::{Alert, Tick};
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{info, warn};

use crate::alert_engine::AlertEngine;

/// Feeds ticks from the ingestor into the engine and forwards alerts to the
/// notifier channel.
///
/// Alerts are handed off with `try_send`: tick processing never waits on the
/// notification sink. If the channel is full or closed the alert is dropped
/// and counted; the baseline stays rebased either way.
pub struct AlertDispatcher {
    engine: Arc<AlertEngine>,
    rx: Receiver<Tick>,
    alerts: Sender<Alert>,
    counters: Counters,
}

impl AlertDispatcher {
    pub fn new(
        engine: Arc<AlertEngine>,
        rx: Receiver<Tick>,
        alerts: Sender<Alert>,
        counters: Counters,
    ) -> Self {
        Self {
            engine,
            rx,
            alerts,
            counters,
        }
    }

    /// Main loop: runs until every tick sender is dropped.
    pub async fn run(mut self) {
        info!("alert dispatcher started");

        while let Some(tick) = self.rx.recv().await {
            Counters::incr(&self.counters.ticks_received);

            let Some(alert) = self.engine.on_tick(&tick) else {
                continue;
            };

            Counters::incr(&self.counters.alerts_emitted);
            info!(
                symbol = %alert.symbol,
                direction = ?alert.direction,
                change_pct = alert.change_pct,
                from = alert.from_price,
                to = alert.to_price,
                "price move alert raised"
            );

            if let Err(e) = self.alerts.try_send(alert) {
                Counters::incr(&self.counters.alerts_dropped);
                warn!(error = %e, "alert not handed to notifier (channel full or closed)");
            }
        }

        warn!("tick stream closed; dispatcher stopping");
    }
}

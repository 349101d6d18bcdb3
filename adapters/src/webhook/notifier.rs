use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::logger::warn_if_slow;
use common::metrics::Counters;
use corelib::Alert;
use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc::Receiver;
use tracing::{error, info, instrument, warn};

use super::errors::NotifyError;

/// Outbound sink for alerts.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;
}

/// Posts `{"content": <message>}` to a chat webhook (Discord-compatible).
///
/// The response body is never read. Any HTTP status counts as delivered;
/// only transport failures are errors.
#[derive(Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    #[instrument(skip(self, alert), fields(symbol = %alert.symbol), level = "debug")]
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let body = json!({ "content": alert.message() });

        let resp = self.http.post(&self.url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = %status, "webhook answered with non-success status");
        }

        Ok(())
    }
}

/// Drains the alert channel, delivering each alert once.
///
/// Failed deliveries are logged and counted, never retried.
pub async fn run_notifier<N>(mut rx: Receiver<Alert>, notifier: Arc<N>, counters: Counters)
where
    N: AlertNotifier + ?Sized,
{
    info!("alert notifier started");

    while let Some(alert) = rx.recv().await {
        let delivery = warn_if_slow(
            "webhook_delivery",
            Duration::from_secs(2),
            notifier.notify(&alert),
        )
        .await;

        match delivery {
            Ok(()) => info!(alert = %alert, "sent alert"),
            Err(e) => {
                Counters::incr(&counters.deliveries_failed);
                error!(error = %e, alert = %alert, "alert delivery failed; dropped");
            }
        }
    }

    warn!("alert channel closed; notifier stopping");
}

use async_trait::async_trait;
use corelib::Tick;
use tokio::sync::mpsc::Sender;

/// Source of live trade ticks.
#[async_trait]
pub trait TickFeed: Send + Sync {
    /// Subscribes to `symbols` and forwards every decoded tick to `sender`.
    ///
    /// Implementations reconnect on their own; the call only returns once the
    /// receiving side of `sender` is gone.
    async fn stream_ticks(&self, symbols: Vec<String>, sender: Sender<Tick>) -> anyhow::Result<()>;
}

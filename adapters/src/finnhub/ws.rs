use std::time::Duration;

use async_trait::async_trait;
use common::logger::{TraceId, connection_span};
use common::metrics::Counters;
use corelib::Tick;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc::Sender;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{Instrument, debug, error, info, instrument, trace, warn};

use super::api::TickFeed;
use super::backoff::{Backoff, BackoffPolicy};
use super::errors::FeedError;
use super::parser::{FeedMessage, parse_feed_message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Finnhub trade stream client.
///
/// Per connection it:
/// - sends one `subscribe` message per symbol (no acknowledgement expected)
/// - decodes `trade` batches and forwards each tick into the channel
/// - treats a read timeout, a socket error or a close frame as a disconnect
///
/// Reconnection is unbounded with exponential backoff.
pub struct FinnhubWsClient {
    ws_url: String,
    api_key: String,
    read_timeout: Duration,
    backoff: BackoffPolicy,
    counters: Counters,
}

impl FinnhubWsClient {
    pub fn new(ws_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            api_key: api_key.into(),
            read_timeout: Duration::from_secs(60),
            backoff: BackoffPolicy::default(),
            counters: Counters::default(),
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_counters(mut self, counters: Counters) -> Self {
        self.counters = counters;
        self
    }

    fn endpoint(&self) -> String {
        let sep = if self.ws_url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.ws_url, sep, self.api_key)
    }

    /// Opens the streaming connection. Bounded by the read timeout.
    pub async fn connect(&self) -> Result<WsStream, FeedError> {
        debug!(url = %self.ws_url, "connecting to feed");

        let (ws, _) = timeout(self.read_timeout, connect_async(self.endpoint()))
            .await
            .map_err(|_| FeedError::Timeout(self.read_timeout))?
            .map_err(FeedError::Connect)?;

        info!("connected to Finnhub");
        Ok(ws)
    }

    /// Send one subscribe message per symbol.
    #[instrument(skip(write, symbols), fields(count = symbols.len()))]
    async fn subscribe<E>(
        write: &mut (impl futures::Sink<Message, Error = E> + Unpin),
        symbols: &[String],
    ) -> Result<(), FeedError>
    where
        E: Into<tokio_tungstenite::tungstenite::Error>,
    {
        for symbol in symbols {
            let text = json!({ "type": "subscribe", "symbol": symbol }).to_string();
            debug!(payload = %text, "sending subscribe request");

            write
                .send(Message::Text(text.into()))
                .await
                .map_err(|e| FeedError::Send(e.into()))?;
        }

        Ok(())
    }

    /// One connection lifecycle: connect, subscribe, read until disconnect.
    ///
    /// `healthy` is set once any feed message decodes (trades, ping or
    /// control), so the caller can reset its backoff. A quiet market that only
    /// sends pings still counts as a healthy connection.
    async fn run_session(
        &self,
        symbols: &[String],
        sender: &Sender<Tick>,
        healthy: &mut bool,
    ) -> Result<(), FeedError> {
        let (mut write, mut read) = self.connect().await?.split();

        Self::subscribe(&mut write, symbols).await?;
        info!(symbols = symbols.len(), "subscribed to instruments");

        loop {
            let next = timeout(self.read_timeout, read.next())
                .await
                .map_err(|_| FeedError::Timeout(self.read_timeout))?;

            let msg = match next {
                Some(Ok(m)) => m,
                Some(Err(e)) => return Err(FeedError::Read(e)),
                None => return Ok(()),
            };

            let raw = match msg {
                Message::Text(t) => t,
                Message::Close(frame) => {
                    info!(frame = ?frame, "server sent close frame");
                    return Ok(());
                }
                Message::Ping(_) | Message::Pong(_) => {
                    trace!("received keep-alive frame");
                    continue;
                }
                other => {
                    debug!(msg_type = ?other, "ignoring non-text websocket message");
                    continue;
                }
            };

            trace!(raw_event = %raw.as_str(), "received raw websocket message");

            let parsed = parse_feed_message(raw.as_str());
            if parsed.is_ok() {
                *healthy = true;
            }

            match parsed {
                Ok(FeedMessage::Trades { ticks, rejected }) => {
                    if rejected > 0 {
                        Counters::add(&self.counters.decode_errors, rejected as u64);
                    }
                    for tick in ticks {
                        sender
                            .send(tick)
                            .await
                            .map_err(|_| FeedError::ChannelClosed)?;
                    }
                }
                Ok(FeedMessage::Ping) => trace!("feed ping"),
                Ok(FeedMessage::Control { kind, msg }) => {
                    if kind.as_deref() == Some("error") {
                        warn!(msg = ?msg, "feed reported an error");
                    } else {
                        debug!(kind = ?kind, "ignoring control message");
                    }
                }
                Err(e) => {
                    Counters::incr(&self.counters.decode_errors);
                    warn!(error = %e, raw = %raw.as_str(), "failed to decode feed message; dropped");
                }
            }
        }
    }
}

#[async_trait]
impl TickFeed for FinnhubWsClient {
    #[instrument(skip(self, symbols, sender), fields(url = %self.ws_url, symbols = symbols.len()))]
    async fn stream_ticks(&self, symbols: Vec<String>, sender: Sender<Tick>) -> anyhow::Result<()> {
        info!("starting Finnhub stream worker");

        let mut backoff = Backoff::new(self.backoff);
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);
            let trace_id = TraceId::new();
            let span = connection_span("finnhub", &trace_id, attempt);

            let mut healthy = false;
            let result = self
                .run_session(&symbols, &sender, &mut healthy)
                .instrument(span)
                .await;

            if healthy {
                backoff.reset();
            }

            match result {
                Err(FeedError::ChannelClosed) => {
                    error!("tick receiver dropped; stream worker shutting down");
                    return Err(FeedError::ChannelClosed.into());
                }
                Err(e) => warn!(trace_id = %trace_id, error = %e, "feed connection lost"),
                Ok(()) => info!(trace_id = %trace_id, "feed connection closed"),
            }

            if sender.is_closed() {
                return Err(FeedError::ChannelClosed.into());
            }

            let delay = backoff.next_delay();
            Counters::incr(&self.counters.reconnects);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "disconnected; attempting reconnection"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_token() {
        let c = FinnhubWsClient::new("wss://ws.finnhub.io", "k123");
        assert_eq!(c.endpoint(), "wss://ws.finnhub.io?token=k123");

        let c = FinnhubWsClient::new("ws://localhost:9000/ws?v=1", "k");
        assert_eq!(c.endpoint(), "ws://localhost:9000/ws?v=1&token=k");
    }
}

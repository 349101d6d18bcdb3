use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("websocket connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("websocket send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("websocket read failed: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("no traffic within {0:?}")]
    Timeout(Duration),

    #[error("malformed feed message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("tick channel closed")]
    ChannelClosed,
}

pub mod api;
pub mod backoff;
pub mod errors;
pub mod parser;
pub mod ws;

pub use api::TickFeed;
pub use backoff::{Backoff, BackoffPolicy};
pub use errors::FeedError;
pub use parser::{FeedMessage, parse_feed_message};
pub use ws::FinnhubWsClient;

/// Public Finnhub streaming endpoint; the API key is appended as `?token=`.
pub const DEFAULT_WS_URL: &str = "wss://ws.finnhub.io";

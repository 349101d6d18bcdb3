//! Finnhub WebSocket message decoding.
//!
//! Trade updates arrive as
//!
//! ```jsonc
//! { "type": "trade", "data": [ { "s": "AAPL", "p": 189.3, "t": 1700000000000, "v": 10 }, ... ] }
//! ```
//!
//! Anything without a `data` field is a control message (`ping`, `error`, ...)
//! and carries no ticks. Individual updates that cannot be decoded are
//! dropped with a warning; the rest of the batch is still delivered.

use corelib::Tick;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::errors::FeedError;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    s: String,
    p: f64,
    #[serde(default)]
    t: Option<i64>,
    #[serde(default)]
    v: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Decoded ticks plus the number of updates that were dropped.
    Trades { ticks: Vec<Tick>, rejected: usize },
    Ping,
    Control {
        kind: Option<String>,
        msg: Option<String>,
    },
}

pub fn parse_feed_message(raw: &str) -> Result<FeedMessage, FeedError> {
    let env: Envelope = serde_json::from_str(raw)?;

    let Some(data) = env.data else {
        return Ok(match env.kind.as_deref() {
            Some("ping") => FeedMessage::Ping,
            _ => FeedMessage::Control {
                kind: env.kind,
                msg: env.msg,
            },
        });
    };

    let Value::Array(updates) = data else {
        return Err(FeedError::InvalidPayload("`data` is not an array".into()));
    };

    let mut ticks = Vec::with_capacity(updates.len());
    let mut rejected = 0;

    for update in updates {
        match decode_trade(update) {
            Ok(tick) => ticks.push(tick),
            Err(e) => {
                rejected += 1;
                warn!(error = %e, "dropping malformed trade update");
            }
        }
    }

    Ok(FeedMessage::Trades { ticks, rejected })
}

fn decode_trade(update: Value) -> Result<Tick, FeedError> {
    let raw: RawTrade =
        serde_json::from_value(update).map_err(|e| FeedError::InvalidPayload(e.to_string()))?;

    if raw.s.is_empty() {
        return Err(FeedError::InvalidPayload("empty symbol".into()));
    }
    if !raw.p.is_finite() {
        return Err(FeedError::InvalidPayload(format!("non-finite price for {}", raw.s)));
    }

    Ok(Tick {
        symbol: raw.s,
        price: raw.p,
        ts_ms: raw.t,
        volume: raw.v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn decodes_trade_batch() {
        let raw = r#"{"data":[
            {"c":null,"p":189.31,"s":"AAPL","t":1700000000123,"v":12},
            {"p":50123.5,"s":"BINANCE:BTCUSDT","t":1700000000456,"v":0.004}
        ],"type":"trade"}"#;

        let FeedMessage::Trades { ticks, rejected } = parse_feed_message(raw).unwrap() else {
            panic!("expected trades");
        };

        assert_eq!(rejected, 0);
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].symbol, "AAPL");
        assert_eq!(ticks[0].price, 189.31);
        assert_eq!(ticks[0].ts_ms, Some(1_700_000_000_123));
        assert_eq!(ticks[1].symbol, "BINANCE:BTCUSDT");
        assert_eq!(ticks[1].volume, Some(0.004));
    }

    #[test]
    fn integer_price_is_accepted() {
        let raw = r#"{"type":"trade","data":[{"s":"IBM","p":150}]}"#;
        let FeedMessage::Trades { ticks, .. } = parse_feed_message(raw).unwrap() else {
            panic!("expected trades");
        };
        assert_eq!(ticks[0].price, 150.0);
        assert_eq!(ticks[0].ts_ms, None);
    }

    #[test]
    fn ping_is_recognized() {
        assert_eq!(parse_feed_message(r#"{"type":"ping"}"#).unwrap(), FeedMessage::Ping);
    }

    #[test]
    fn messages_without_data_are_control() {
        let msg = parse_feed_message(r#"{"type":"error","msg":"Invalid token"}"#).unwrap();
        assert_eq!(
            msg,
            FeedMessage::Control {
                kind: Some("error".into()),
                msg: Some("Invalid token".into()),
            }
        );

        let msg = parse_feed_message(r#"{"type":"trade","data":null}"#).unwrap();
        assert!(matches!(msg, FeedMessage::Control { .. }));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            parse_feed_message("not json"),
            Err(FeedError::Decode(_))
        ));
    }

    #[test]
    fn non_array_data_is_an_error() {
        assert!(matches!(
            parse_feed_message(r#"{"type":"trade","data":{"s":"AAPL","p":1}}"#),
            Err(FeedError::InvalidPayload(_))
        ));
    }

    #[traced_test]
    #[test]
    fn malformed_updates_are_dropped_individually() {
        let raw = r#"{"type":"trade","data":[
            {"s":"AAPL","p":"abc"},
            {"p":10.0},
            {"s":"","p":1.0},
            {"s":"MSFT","p":410.5}
        ]}"#;

        let FeedMessage::Trades { ticks, rejected } = parse_feed_message(raw).unwrap() else {
            panic!("expected trades");
        };

        assert_eq!(rejected, 3);
        assert_eq!(ticks, vec![Tick::new("MSFT", 410.5)]);
        assert!(logs_contain("dropping malformed trade update"));
    }
}

use std::sync::Arc;
use std::time::Duration;

use adapters::webhook::{AlertNotifier, NotifyError, WebhookNotifier, run_notifier};
use async_trait::async_trait;
use common::metrics::Counters;
use corelib::{Alert, AssetClass, Direction};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

fn alert(symbol: &str) -> Alert {
    Alert {
        asset_class: AssetClass::Equity,
        symbol: symbol.into(),
        direction: Direction::Up,
        change_pct: 1.0,
        from_price: 100.0,
        to_price: 101.0,
    }
}

/// Accepts one HTTP request, answers with `status_line`, returns the request body.
async fn spawn_http_sink(status_line: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                return String::new();
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(body) = complete_body(&buf) {
                let resp = format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                sock.write_all(resp.as_bytes()).await.unwrap();
                return body;
            }
        }
    });

    (format!("http://{addr}/hook"), handle)
}

fn complete_body(buf: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let (head, body) = text.split_once("\r\n\r\n")?;
    let len = head.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if k.eq_ignore_ascii_case("content-length") {
            v.trim().parse::<usize>().ok()
        } else {
            None
        }
    })?;
    (body.len() >= len).then(|| body[..len].to_string())
}

async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/hook")
}

#[tokio::test]
async fn posts_message_as_content_field() {
    let (url, sink) = spawn_http_sink("HTTP/1.1 204 No Content").await;
    let notifier = WebhookNotifier::new(url).unwrap();

    notifier.notify(&alert("AAPL")).await.unwrap();

    let body: serde_json::Value = serde_json::from_str(&sink.await.unwrap()).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "content": "📈 Stock AAPL up 1.00% (100.00 -> 101.00)" })
    );
}

#[tokio::test]
async fn error_status_still_counts_as_delivered() {
    let (url, sink) = spawn_http_sink("HTTP/1.1 500 Internal Server Error").await;
    let notifier = WebhookNotifier::new(url).unwrap();

    assert!(notifier.notify(&alert("AAPL")).await.is_ok());
    sink.await.unwrap();
}

#[tokio::test]
async fn unreachable_sink_is_a_transport_error() {
    let notifier = WebhookNotifier::new(dead_url().await).unwrap();

    let err = notifier.notify(&alert("AAPL")).await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)));
}

/// Fails for symbols starting with "FAIL", records everything else.
struct FlakyNotifier {
    dead: WebhookNotifier,
    delivered: Mutex<Vec<String>>,
}

#[async_trait]
impl AlertNotifier for FlakyNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        if alert.symbol.starts_with("FAIL") {
            return self.dead.notify(alert).await;
        }
        self.delivered.lock().await.push(alert.symbol.clone());
        Ok(())
    }
}

#[tokio::test]
async fn notifier_loop_survives_delivery_failures() {
    let notifier = Arc::new(FlakyNotifier {
        dead: WebhookNotifier::new(dead_url().await).unwrap(),
        delivered: Mutex::new(Vec::new()),
    });
    let counters = Counters::default();

    let (tx, rx) = mpsc::channel(8);
    for s in ["AAPL", "FAIL1", "MSFT", "FAIL2", "TSLA"] {
        tx.send(alert(s)).await.unwrap();
    }
    drop(tx);

    tokio::time::timeout(
        Duration::from_secs(10),
        run_notifier(rx, Arc::clone(&notifier), counters.clone()),
    )
    .await
    .expect("notifier should drain and stop");

    assert_eq!(*notifier.delivered.lock().await, vec!["AAPL", "MSFT", "TSLA"]);
    assert_eq!(counters.snapshot().deliveries_failed, 2);
}

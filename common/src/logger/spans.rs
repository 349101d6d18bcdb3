use std::time::{Duration, Instant};

use tracing::Span;

use super::TraceId;

/// Span wrapping a single feed connection attempt and its read loop.
pub fn connection_span(source: &'static str, trace_id: &TraceId, attempt: u32) -> Span {
    tracing::info_span!(
        "connection",
        source = %source,
        trace_id = %trace_id,
        attempt
    )
}

/// Awaits `fut` and emits a warning when it takes longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn warn_if_slow_passes_output_through() {
        let out = warn_if_slow("noop", Duration::from_secs(1), async { 7 }).await;
        assert_eq!(out, 7);
    }
}

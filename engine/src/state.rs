use corelib::Direction;

/// Per-instrument price state.
///
/// Exists only once a first tick has been seen, so `baseline_price` is
/// always defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentState {
    /// Reference for the next move. Rebased to the triggering price on every alert.
    pub baseline_price: f64,
    pub latest_price: f64,
}

/// A move that crossed the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceMove {
    pub direction: Direction,
    pub change_pct: f64,
    pub from_price: f64,
    pub to_price: f64,
}

impl InstrumentState {
    /// State after the first observed tick.
    pub fn new(price: f64) -> Self {
        Self {
            baseline_price: price,
            latest_price: price,
        }
    }

    /// Applies a subsequent tick.
    ///
    /// `threshold` is `None` for unclassified instruments, which only track
    /// the latest price. Returns the move when it crosses the threshold, in
    /// which case the baseline has already been rebased to `price`.
    pub fn apply(&mut self, price: f64, threshold: Option<f64>) -> Option<PriceMove> {
        let from = self.baseline_price;
        self.latest_price = price;

        // zero baseline is never meaningful
        if from == 0.0 {
            return None;
        }

        let threshold = threshold?;
        let change_pct = (price - from) / from * 100.0;

        let direction = if change_pct >= threshold {
            Direction::Up
        } else if change_pct <= -threshold {
            Direction::Down
        } else {
            return None;
        };

        self.baseline_price = price;

        Some(PriceMove {
            direction,
            change_pct,
            from_price: from,
            to_price: price,
        })
    }
}

use corelib::AssetClass;

/// Percentage move (absolute) that triggers an alert, per asset class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub equity_pct: f64,
    pub crypto_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            equity_pct: 1.0,
            crypto_pct: 0.5,
        }
    }
}

impl Thresholds {
    pub fn for_class(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::Equity => self.equity_pct,
            AssetClass::Crypto => self.crypto_pct,
        }
    }
}

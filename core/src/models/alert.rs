use serde::Serialize;

use super::AssetClass;

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn glyph(&self) -> &'static str {
        match self {
            Direction::Up => "📈",
            Direction::Down => "📉",
        }
    }

    pub fn word(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// A qualifying percentage move, measured from the instrument's baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub asset_class: AssetClass,
    pub symbol: String,
    pub direction: Direction,
    pub change_pct: f64,

    /// Baseline the move was measured from.
    pub from_price: f64,
    /// Price of the triggering tick; becomes the new baseline.
    pub to_price: f64,
}

impl Alert {
    /// Human-readable notification body.
    pub fn message(&self) -> String {
        format!(
            "{} {} {} {} {:.2}% ({:.2} -> {:.2})",
            self.direction.glyph(),
            self.asset_class.label(),
            self.symbol,
            self.direction.word(),
            self.change_pct,
            self.from_price,
            self.to_price
        )
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(class: AssetClass, symbol: &str, dir: Direction, pct: f64, from: f64, to: f64) -> Alert {
        Alert {
            asset_class: class,
            symbol: symbol.into(),
            direction: dir,
            change_pct: pct,
            from_price: from,
            to_price: to,
        }
    }

    #[test]
    fn equity_up_message() {
        let a = alert(AssetClass::Equity, "AAPL", Direction::Up, 1.0, 100.0, 101.0);
        assert_eq!(a.message(), "📈 Stock AAPL up 1.00% (100.00 -> 101.00)");
    }

    #[test]
    fn crypto_down_message_keeps_sign() {
        let a = alert(
            AssetClass::Crypto,
            "BINANCE:BTCUSDT",
            Direction::Down,
            -0.6,
            50_000.0,
            49_700.0,
        );
        assert_eq!(
            a.message(),
            "📉 Crypto BINANCE:BTCUSDT down -0.60% (50000.00 -> 49700.00)"
        );
    }

    #[test]
    fn display_matches_message() {
        let a = alert(AssetClass::Equity, "MSFT", Direction::Down, -1.0101, 99.0, 98.0);
        assert_eq!(a.to_string(), a.message());
        assert!(a.to_string().contains("-1.01%"));
    }

    #[test]
    fn serializes_for_structured_logs() {
        let a = alert(AssetClass::Crypto, "BINANCE:ETHUSDT", Direction::Up, 0.9, 2000.0, 2018.0);
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["asset_class"], "Crypto");
        assert_eq!(v["direction"], "Up");
        assert_eq!(v["symbol"], "BINANCE:ETHUSDT");
    }
}

use serde::{Deserialize, Serialize};

pub mod alert;
pub mod tick;

pub use alert::{Alert, Direction};
pub use tick::Tick;

/// Asset class an instrument belongs to. Decides which alert threshold applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub enum AssetClass {
    Equity,
    Crypto,
}

impl AssetClass {
    /// Label used in outbound alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Equity => "Stock",
            AssetClass::Crypto => "Crypto",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

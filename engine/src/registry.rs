use std::collections::HashMap;
use std::collections::hash_map::Entry;

use corelib::AssetClass;
use tracing::warn;

/// Static instrument → asset class lookup, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    classes: HashMap<String, AssetClass>,
    /// Subscription order: equities first, then crypto.
    order: Vec<String>,
}

impl InstrumentRegistry {
    /// Builds the table from the two membership lists.
    ///
    /// A symbol listed as both equity and crypto is kept as an equity.
    pub fn new(
        equities: impl IntoIterator<Item = impl Into<String>>,
        crypto: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut reg = Self::default();

        for symbol in equities {
            reg.insert(symbol.into(), AssetClass::Equity);
        }
        for symbol in crypto {
            reg.insert(symbol.into(), AssetClass::Crypto);
        }

        reg
    }

    fn insert(&mut self, symbol: String, class: AssetClass) {
        match self.classes.entry(symbol) {
            Entry::Vacant(v) => {
                self.order.push(v.key().clone());
                v.insert(class);
            }
            Entry::Occupied(o) => {
                if *o.get() != class {
                    warn!(
                        symbol = %o.key(),
                        kept = ?o.get(),
                        ignored = ?class,
                        "instrument listed under two asset classes"
                    );
                }
            }
        }
    }

    pub fn classify(&self, symbol: &str) -> Option<AssetClass> {
        self.classes.get(symbol).copied()
    }

    /// Every tracked symbol, in subscription order.
    pub fn symbols(&self) -> &[String] {
        &self.order
    }

    pub fn count(&self, class: AssetClass) -> usize {
        self.classes.values().filter(|c| **c == class).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

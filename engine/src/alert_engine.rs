use std::collections::HashMap;
use std::sync::Arc;

use corelib::{Alert, Tick};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::registry::InstrumentRegistry;
use crate::state::InstrumentState;
use crate::thresholds::Thresholds;

/// Turns ticks into alerts and owns all per-instrument price state.
///
/// Concurrency:
/// - the map lock is only held to look up or create an instrument slot;
/// - the whole read-compare-rebase step runs under that instrument's own
///   mutex, so two concurrent ticks can never both fire off the same baseline;
/// - different instruments never share a mutex.
pub struct AlertEngine {
    registry: InstrumentRegistry,
    thresholds: Thresholds,
    states: RwLock<HashMap<String, Arc<Mutex<InstrumentState>>>>,
}

impl AlertEngine {
    pub fn new(registry: InstrumentRegistry, thresholds: Thresholds) -> Self {
        Self {
            registry,
            thresholds,
            states: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    /// Processes one tick. Returns the alert to deliver, if the move qualifies.
    ///
    /// The first tick for an instrument only establishes its baseline.
    #[instrument(skip(self, tick), fields(symbol = %tick.symbol, price = tick.price), level = "trace")]
    pub fn on_tick(&self, tick: &Tick) -> Option<Alert> {
        let slot = self.slot_or_init(tick)?;

        let class = self.registry.classify(&tick.symbol);
        let threshold = class.map(|c| self.thresholds.for_class(c));

        let movement = slot.lock().apply(tick.price, threshold)?;

        // `apply` only fires for classified instruments
        let asset_class = class?;

        Some(Alert {
            asset_class,
            symbol: tick.symbol.clone(),
            direction: movement.direction,
            change_pct: movement.change_pct,
            from_price: movement.from_price,
            to_price: movement.to_price,
        })
    }

    /// Returns the existing slot, or creates it from this tick and returns `None`.
    fn slot_or_init(&self, tick: &Tick) -> Option<Arc<Mutex<InstrumentState>>> {
        if let Some(slot) = self.states.read().get(&tick.symbol) {
            return Some(Arc::clone(slot));
        }

        let mut map = self.states.write();
        if let Some(slot) = map.get(&tick.symbol) {
            // lost the race to another first tick
            return Some(Arc::clone(slot));
        }

        map.insert(
            tick.symbol.clone(),
            Arc::new(Mutex::new(InstrumentState::new(tick.price))),
        );
        debug!(symbol = %tick.symbol, price = tick.price, "baseline established");
        None
    }

    #[cfg(test)]
    pub(crate) fn tracked(&self) -> usize {
        self.states.read().len()
    }

    #[cfg(test)]
    pub(crate) fn state_of(&self, symbol: &str) -> Option<InstrumentState> {
        self.states.read().get(symbol).map(|s| *s.lock())
    }
}

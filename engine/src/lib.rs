//! Price-move alerting.
//!
//! The [`AlertEngine`] owns one baseline/latest price pair per instrument and
//! turns each incoming tick into zero or one [`corelib::Alert`]. The
//! [`AlertDispatcher`] drives it from a tick channel and hands alerts off to
//! the notifier without waiting on delivery.

pub mod alert_engine;
pub mod dispatcher;
pub mod registry;
pub mod state;
pub mod thresholds;

pub use alert_engine::AlertEngine;
pub use dispatcher::AlertDispatcher;
pub use registry::InstrumentRegistry;
pub use state::{InstrumentState, PriceMove};
pub use thresholds::Thresholds;

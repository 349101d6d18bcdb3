pub mod errors;
pub mod notifier;

pub use errors::NotifyError;
pub use notifier::{AlertNotifier, WebhookNotifier, run_notifier};

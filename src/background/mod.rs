//! Background (privileged, DOM-less) execution context.

pub mod messages;
pub mod notifier;

pub use messages::{PageMessage, TabId, TabStatus, TabUpdate};
pub use notifier::{CrossContextNotifier, MessageChannel};

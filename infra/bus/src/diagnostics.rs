use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// `tracing` target of advisory warnings (unhandled, overwritten, unregistered).
pub const DEBUG_TARGET: &str = "radio::debug";
/// `tracing` target of the channel activity relay.
pub const ACTIVITY_TARGET: &str = "radio::activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Warning {
    UnhandledCommand,
    UnhandledRequest,
    CommandOverwritten,
    RequestOverwritten,
    UnregisteredCommand,
    UnregisteredRequest,
}

impl Warning {
    const fn message(self) -> &'static str {
        match self {
            Self::UnhandledCommand => "An unhandled command was fired",
            Self::UnhandledRequest => "An unhandled request was fired",
            Self::CommandOverwritten => "A command was overwritten",
            Self::RequestOverwritten => "A request was overwritten",
            Self::UnregisteredCommand => "Attempted to remove the unregistered command",
            Self::UnregisteredRequest => "Attempted to remove the unregistered request",
        }
    }
}

/// Debug-mode switch shared by a registry and all of its channels.
#[derive(Debug, Clone, Default)]
pub(crate) struct Diagnostics {
    debug: Arc<AtomicBool>,
}

impl Diagnostics {
    pub(crate) fn is_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    pub(crate) fn warn(&self, warning: Warning, name: &str, channel: &str) {
        if self.is_enabled() {
            warn!(target: DEBUG_TARGET, channel, name, "{} on the {channel} channel: \"{name}\"", warning.message());
        }
    }
}

/// Writes one activity line for `event` on `channel`.
pub(crate) fn activity(channel: &str, event: &str, args: &[Value]) {
    let payload = Value::from(args.to_vec());
    info!(target: ACTIVITY_TARGET, channel, event, args = %payload, "[{channel}] \"{event}\"");
}

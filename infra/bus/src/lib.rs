//! # Radio Bus
//!
//! In-process messaging on named channels, with three patterns sharing one
//! dispatch convention:
//!
//! - **Events**: many listeners per name, plus the `"all"` wildcard.
//! - **Commands**: fire-and-forget, one handler per name.
//! - **Requests**: call-and-return, one handler per name.
//!
//! Every operation takes a [`Key`] first: a name, a whitespace-separated list of
//! names, an explicit list, or a name→value mapping. Multi-name keys fan out into
//! one sub-call per name, in order. Commands and requests fall back to a handler
//! registered as `"default"`, which receives the name in front of the arguments.
//!
//! Dispatch is synchronous and re-entrant: handlers may register, remove and fire
//! on any channel while they run.
//!
//! ## Features
//! - **Isolated registries**: [`Radio`] instances never share channels.
//! - **Diagnostics**: with debug on, unhandled, overwritten and unregistered
//!   handlers are reported as `WARN` events under [`DEBUG_TARGET`].
//! - **Tune-in**: channel activity is relayed as `INFO` events under [`ACTIVITY_TARGET`].
//!
//! ## Example
//!
//! ```rust
//! use radio_bus::{Handler, Radio, Response, json};
//!
//! # fn main() -> Result<(), radio_bus::RadioError> {
//! let radio = Radio::new();
//! let app = radio.channel("app")?;
//!
//! app.reply("user", Handler::new(|_, args| json!({ "id": args[0] })))
//!     .reply("version", json!("1.0"));
//!
//! assert_eq!(app.request("user", &[json!(7)]).into_value(), Some(json!({ "id": 7 })));
//! assert_eq!(
//!     app.request("version missing", &[]),
//!     Response::Many(vec![Response::Single(Some(json!("1.0"))), Response::Single(None)])
//! );
//! # Ok(())
//! # }
//! ```

mod channel;
mod commands;
mod config;
mod diagnostics;
mod error;
mod events;
mod handler;
mod names;
mod registry;
mod requests;
mod store;

pub use crate::channel::Channel;
pub use crate::config::{LoggingConfig, RadioConfig};
pub use crate::diagnostics::{ACTIVITY_TARGET, DEBUG_TARGET};
pub use crate::error::{RadioError, RadioErrorExt};
pub use crate::events::{ALL_EVENTS, Emitter, EventBus};
pub use crate::handler::{Callback, Context, Filter, Handler, Registration, Reply};
pub use crate::names::Key;
pub use crate::registry::Radio;
pub use crate::requests::Response;
pub use crate::store::DEFAULT_HANDLER;
pub use serde_json::{Value, json};

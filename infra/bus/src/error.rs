use std::borrow::Cow;

/// Errors raised by structural misuse of the messaging API.
///
/// Missing handlers are never errors; they are reported as diagnostics
/// when debug mode is enabled.
#[radio_derive::radio_error]
pub enum RadioError {
    /// A channel was requested or constructed with an empty name.
    #[error("Invalid channel name{}: {message}", format_context(.context))]
    InvalidChannelName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RadioError {
    pub(crate) fn missing_channel_name() -> Self {
        Self::InvalidChannelName {
            message: "You must provide a name for the channel".into(),
            context: None,
        }
    }
}

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Level at which the fault interceptor records a fault.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    #[default]
    Error,
    /// Do not log at all.
    None,
}

/// Severity the client uses to present a message (toast, warning, error dialog...).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ViewLevel {
    Info,
    Warn,
    #[default]
    Error,
    Fatal,
}

/// Emits a `tracing` event at a level chosen at runtime from a [`LogLevel`].
///
/// `LogLevel::None` swallows the event.
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            $crate::common::LogLevel::Trace => ::tracing::trace!($($arg)+),
            $crate::common::LogLevel::Debug => ::tracing::debug!($($arg)+),
            $crate::common::LogLevel::Info => ::tracing::info!($($arg)+),
            $crate::common::LogLevel::Warn => ::tracing::warn!($($arg)+),
            $crate::common::LogLevel::Error => ::tracing::error!($($arg)+),
            $crate::common::LogLevel::None => {}
        }
    };
}

pub(crate) use log_at;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeystoneError>;

/// Infrastructure errors raised by keystone itself (serialization, I/O, HTTP, config).
///
/// Request-level failures are modelled by [`crate::exception::Fault`] instead; these
/// errors only reach the fault interceptor when callers propagate them as unclassified.
#[derive(Debug, Error)]
pub enum KeystoneError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration for '{key}': {message}")]
    Config { key: String, message: String },

    #[error("JSON document is not an object: {0}")]
    NotAnObject(String),
}

impl KeystoneError {
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "sea-orm-db")]
impl From<sea_orm::DbErr> for crate::exception::Fault {
    fn from(err: sea_orm::DbErr) -> Self {
        crate::exception::Fault::internal_from(err)
    }
}

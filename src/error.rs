//! Error types for Kondex

use thiserror::Error;

/// Result type alias using Kondex's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kondex error types
///
/// A local usage without a binding, or a cursor over nothing, is not an
/// error: those come back as `None` or an empty list.
#[derive(Error, Debug)]
pub enum Error {
    /// Send or receive failed on the analyzer connection
    #[error("Transport error: {message}: {source}")]
    Transport {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The analyzer answered with something that is not a complete JSON line
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The analyzer itself reported a failure
    #[error("Analyzer error: {message}")]
    Analyzer { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Buffer not open: {0}")]
    UnknownBuffer(crate::analysis::BufferId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn transport(message: impl Into<String>, source: std::io::Error) -> Self {
        Error::Transport {
            message: message.into(),
            source,
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Error::Protocol {
            message: message.into(),
        }
    }

    pub(crate) fn analyzer(message: impl Into<String>) -> Self {
        Error::Analyzer {
            message: message.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

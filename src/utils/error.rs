use std::fmt;

// Note: `thiserror`'s derive cannot be used here because the `UnsupportedSource`
// variant has a field named `source` that is a plain `String`, and the derive
// unconditionally treats a field with that name as the error-chain source
// (which must implement `std::error::Error`). The impls below reproduce exactly
// what the derive attributes specified.
#[derive(Debug)]
pub enum GatewayError {
    UnsupportedSource { source: String },

    UnsupportedOperation { operation: &'static str },

    Transport(reqwest::Error),

    RemoteStatus { action: String, status: u16 },

    Decode(serde_json::Error),

    InvalidRecord { message: String },

    NotFound,

    Db(rusqlite::Error),

    Io(std::io::Error),

    ConfigError { message: String },

    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::UnsupportedSource { source } => {
                write!(f, "unsupported register source: {source}")
            }
            GatewayError::UnsupportedOperation { operation } => {
                write!(
                    f,
                    "operation `{operation}` is not available for this register's backend"
                )
            }
            GatewayError::Transport(e) => write!(f, "data API request failed: {e}"),
            GatewayError::RemoteStatus { action, status } => {
                write!(f, "data API returned HTTP {status} for action `{action}`")
            }
            GatewayError::Decode(e) => write!(f, "failed to decode document payload: {e}"),
            GatewayError::InvalidRecord { message } => {
                write!(f, "invalid persisted record: {message}")
            }
            GatewayError::NotFound => write!(f, "no document matched the given filter"),
            GatewayError::Db(e) => write!(f, "database error: {e}"),
            GatewayError::Io(e) => write!(f, "IO error: {e}"),
            GatewayError::ConfigError { message } => {
                write!(f, "configuration error: {message}")
            }
            GatewayError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => {
                write!(f, "invalid value for {field}: `{value}` ({reason})")
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Transport(e) => Some(e),
            GatewayError::Decode(e) => Some(e),
            GatewayError::Db(e) => Some(e),
            GatewayError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(e: rusqlite::Error) -> Self {
        GatewayError::Db(e)
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

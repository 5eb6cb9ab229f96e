use std::fmt;

use thiserror::Error;

/// SQLSTATE raised by Postgres when a relation does not exist.
pub const UNDEFINED_TABLE: &str = "42P01";

/// Error reported by the remote database, kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    /// Machine-readable SQLSTATE, absent for transport-level failures.
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Error without a SQLSTATE (network, TLS, pool exhaustion, ...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    pub fn is_undefined_table(&self) -> bool {
        self.code.as_deref() == Some(UNDEFINED_TABLE)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (SQLSTATE {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl From<sqlx::Error> for RemoteError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => RemoteError {
                code: db_err.code().map(|c| c.to_string()),
                message: db_err.message().to_string(),
            },
            other => RemoteError::transport(other.to_string()),
        }
    }
}

/// Custom error type for provisioning.
#[derive(Error, Debug)]
pub enum DbError {
    /// Configuration error (e.g., missing database URL or unknown mode).
    #[error("Configuration error: {0}")]
    Config(String),
    /// Connection error (e.g., issues with network or database connection).
    #[error("Connection error: {0}")]
    Connection(String),
    /// Schema references a column it does not declare.
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),
}

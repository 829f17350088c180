use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MetError {
    #[error("Met Office request failed: {0}")]
    FetchHttp(String),

    #[error("Met Office returned status {status}: {message}")]
    FetchStatus { status: u16, message: String },

    #[error("malformed report: {0}")]
    MalformedReport(String),

    #[error("invalid {argument}: {value}")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl MetError {
    pub fn invalid(argument: &'static str, value: impl ToString) -> Self {
        MetError::InvalidArgument {
            argument,
            value: value.to_string(),
        }
    }
}

use std::fmt;
use thiserror::Error;

use crate::connectors::ConnectorError;
use crate::handlers::HandlerError;

/// Which way a handler was being driven when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Extract,
    Apply,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Extract => f.write_str("extract"),
            Direction::Apply => f.write_str("apply"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{handler} handler failed during {direction}: {source}")]
    Handler {
        handler: &'static str,
        direction: Direction,
        #[source]
        source: HandlerError,
    },

    #[error("Template storage error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

//! Error types for the market data router

use thiserror::Error;

use crate::parser::ParseError;

/// Market data router errors
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Malformed command: {0}")]
    Parse(#[from] ParseError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),
}

impl MarketDataError {
    /// Stable label used for failure metrics
    pub fn kind(&self) -> &'static str {
        match self {
            MarketDataError::UnknownSymbol(_) => "unknown_symbol",
            MarketDataError::Parse(ParseError::Blank) => "blank_command",
            MarketDataError::Parse(ParseError::UnknownVerb(_)) => "unknown_command",
            MarketDataError::Parse(ParseError::InvalidArgs { .. }) => "invalid_args",
            MarketDataError::Parse(ParseError::InvalidPrice(_)) => "invalid_price",
            MarketDataError::Parse(ParseError::PriceOutOfRange(_)) => "price_out_of_range",
            MarketDataError::Parse(ParseError::InvalidEncoding) => "invalid_encoding",
            MarketDataError::ConfigError(_) => "config",
            MarketDataError::IoError(_) => "io",
            MarketDataError::SerializationError(_) => "serialization",
            MarketDataError::MetricsError(_) => "metrics",
        }
    }
}

impl From<std::io::Error> for MarketDataError {
    fn from(err: std::io::Error) -> Self {
        MarketDataError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        MarketDataError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for MarketDataError {
    fn from(err: config::ConfigError) -> Self {
        MarketDataError::ConfigError(err.to_string())
    }
}

impl From<prometheus::Error> for MarketDataError {
    fn from(err: prometheus::Error) -> Self {
        MarketDataError::MetricsError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MarketDataError>;

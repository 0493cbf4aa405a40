//! Parser module for input command lines
//!
//! Turns a whitespace-separated line into a typed command.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Command line parse failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("blank command")]
    Blank,

    #[error("unknown command: {0}")]
    UnknownVerb(String),

    #[error("invalid args for {verb}: got {got}")]
    InvalidArgs { verb: Verb, got: usize },

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("price out of range: {0}")]
    PriceOutOfRange(String),

    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

/// Command word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Tick,
    Subscribe,
    Unsubscribe,
    Quit,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Tick => "tick",
            Verb::Subscribe => "subscribe",
            Verb::Unsubscribe => "unsubscribe",
            Verb::Quit => "quit",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tick" => Ok(Verb::Tick),
            "subscribe" => Ok(Verb::Subscribe),
            "unsubscribe" => Ok(Verb::Unsubscribe),
            "quit" => Ok(Verb::Quit),
            other => Err(ParseError::UnknownVerb(other.to_string())),
        }
    }
}

/// A market data command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tick {
        symbol: String,
        price: Decimal,
    },
    Subscribe {
        user: String,
        symbol: String,
        /// Defaults to the security's native currency
        currency: Option<String>,
    },
    Unsubscribe {
        user: String,
        symbol: String,
        currency: Option<String>,
    },
}

impl Command {
    pub fn verb(&self) -> Verb {
        match self {
            Command::Tick { .. } => Verb::Tick,
            Command::Subscribe { .. } => Verb::Subscribe,
            Command::Unsubscribe { .. } => Verb::Unsubscribe,
        }
    }
}

/// Parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Quit,
    Command(Command),
}

impl ParsedLine {
    /// Parse a raw input line
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut tokens = raw.split_whitespace();
        let verb: Verb = tokens.next().ok_or(ParseError::Blank)?.parse()?;
        let args: Vec<&str> = tokens.collect();

        match (verb, args.as_slice()) {
            (Verb::Quit, []) => Ok(ParsedLine::Quit),
            (Verb::Tick, [symbol, price]) => Ok(ParsedLine::Command(Command::Tick {
                symbol: symbol.to_string(),
                price: parse_price(price)?,
            })),
            (Verb::Subscribe, [user, symbol, currency @ ..]) if currency.len() <= 1 => {
                Ok(ParsedLine::Command(Command::Subscribe {
                    user: user.to_string(),
                    symbol: symbol.to_string(),
                    currency: currency.first().map(|c| c.to_string()),
                }))
            }
            (Verb::Unsubscribe, [user, symbol, currency @ ..]) if currency.len() <= 1 => {
                Ok(ParsedLine::Command(Command::Unsubscribe {
                    user: user.to_string(),
                    symbol: symbol.to_string(),
                    currency: currency.first().map(|c| c.to_string()),
                }))
            }
            (verb, args) => Err(ParseError::InvalidArgs {
                verb,
                got: args.len(),
            }),
        }
    }
}

/// Parse a decimal price literal, accepting scientific notation
///
/// Finite numeric literals whose magnitude `Decimal` cannot hold (above
/// about 7.9e28) are `PriceOutOfRange`.
pub fn parse_price(text: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| match text.parse::<f64>() {
            Ok(value) if value.is_finite() => ParseError::PriceOutOfRange(text.to_string()),
            _ => ParseError::InvalidPrice(text.to_string()),
        })
}

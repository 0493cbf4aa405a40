//! Market Data Router Library
//!
//! Maintains live security prices and routes currency-converted price
//! notifications to entitled subscribers over a line-oriented command stream.

pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod parser;
pub mod publisher;
pub mod service;

pub use config::{LogFormat, MarketConfig, Settings};
pub use error::{MarketDataError, Result};
pub use market::{Entitlements, Security, SecurityRegistry, Subscription, SubscriptionIndex};
pub use metrics::ServiceMetrics;
pub use parser::{Command, ParseError, ParsedLine};
pub use publisher::Publisher;
pub use service::{CommandLoop, CommandProcessor, RequestContext, RunSummary};

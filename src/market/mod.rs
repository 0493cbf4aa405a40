//! Market state module
//!
//! Security prices, user entitlements and the subscription topic index,
//! plus rendering of currency-adjusted notifications.

mod entitlements;
mod index;
mod notification;
mod registry;

pub use entitlements::Entitlements;
pub use index::{SubscriptionId, SubscriptionIndex};
pub use notification::{convert_currency, render, PRICE_PRECISION};
pub use registry::SecurityRegistry;

use rust_decimal::Decimal;
use std::fmt;

/// Currency used to express exchange rates when none is configured
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// A priced market data series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Security {
    pub symbol: String,
    /// Native currency the price is quoted in
    pub currency: String,
    /// Latest price, absent until the first tick
    pub price: Option<Decimal>,
}

impl Security {
    pub fn new(symbol: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            currency: currency.into(),
            price: None,
        }
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }
}

/// A user's request for price updates of a symbol expressed in a currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription {
    pub user: String,
    pub symbol: String,
    pub currency: String,
}

impl Subscription {
    pub fn new(
        user: impl Into<String>,
        symbol: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            symbol: symbol.into(),
            currency: currency.into(),
        }
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.user, self.symbol, self.currency)
    }
}

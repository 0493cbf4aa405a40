//! Security registry
//!
//! Current price and native currency per symbol.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::Security;
use crate::error::{MarketDataError, Result};

/// Holds every configured security, including the base currency itself
#[derive(Debug)]
pub struct SecurityRegistry {
    securities: HashMap<String, Security>,
    base_currency: String,
}

impl SecurityRegistry {
    /// Create a registry with the base currency priced at 1 in itself
    pub fn new(base_currency: &str) -> Self {
        let mut securities = HashMap::new();
        securities.insert(
            base_currency.to_string(),
            Security::new(base_currency, base_currency).with_price(Decimal::ONE),
        );
        Self {
            securities,
            base_currency: base_currency.to_string(),
        }
    }

    /// Register a configured security
    ///
    /// The synthetic base currency entry is never replaced.
    pub fn register(&mut self, symbol: &str, currency: &str) {
        if symbol == self.base_currency {
            return;
        }
        self.securities
            .insert(symbol.to_string(), Security::new(symbol, currency));
    }

    pub fn get(&self, symbol: &str) -> Option<&Security> {
        self.securities.get(symbol)
    }

    /// Latest price, absent for unknown symbols and unpriced securities
    pub fn price(&self, symbol: &str) -> Option<Decimal> {
        self.securities.get(symbol).and_then(|sec| sec.price)
    }

    /// Update the price in place, returning the previous one
    pub fn set_price(&mut self, symbol: &str, price: Decimal) -> Result<Option<Decimal>> {
        let security = self
            .securities
            .get_mut(symbol)
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))?;
        Ok(security.price.replace(price))
    }

    pub fn native_currency(&self, symbol: &str) -> Option<&str> {
        self.securities.get(symbol).map(|sec| sec.currency.as_str())
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }
}

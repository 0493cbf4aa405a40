//! Command processor
//!
//! Applies parsed commands to the market state and returns the messages to
//! publish, in order.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::RequestContext;
use crate::config::MarketConfig;
use crate::error::{MarketDataError, Result};
use crate::market::{render, Entitlements, SecurityRegistry, Subscription, SubscriptionIndex};
use crate::parser::Command;

pub const MSG_SUBSCRIPTION_EXISTS: &str = "Subscription already exists";
pub const MSG_SUBSCRIPTION_MISSING: &str = "Subscription does not exist";

fn not_entitled(user: &str, code: &str) -> String {
    format!("User {} is not entitled to {}", user, code)
}

/// Owns all market state for a single command stream
#[derive(Debug)]
pub struct CommandProcessor {
    registry: SecurityRegistry,
    entitlements: Entitlements,
    index: SubscriptionIndex,
}

impl CommandProcessor {
    pub fn new(registry: SecurityRegistry, entitlements: Entitlements) -> Self {
        Self {
            registry,
            entitlements,
            index: SubscriptionIndex::new(),
        }
    }

    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.registry(), config.entitlements())
    }

    /// Execute one command
    ///
    /// Entitlement, duplicate and absence outcomes are returned as messages;
    /// an unknown symbol is an error and nothing is published.
    pub fn execute(&mut self, command: &Command, ctx: &RequestContext) -> Result<Vec<String>> {
        match command {
            Command::Tick { symbol, price } => self.on_tick(symbol, *price, ctx),
            Command::Subscribe {
                user,
                symbol,
                currency,
            } => self.on_subscribe(user, symbol, currency.as_deref(), ctx),
            Command::Unsubscribe {
                user,
                symbol,
                currency,
            } => self.on_unsubscribe(user, symbol, currency.as_deref(), ctx),
        }
    }

    /// Update the price and notify every subscriber of the symbol, even when
    /// the price did not change
    fn on_tick(
        &mut self,
        symbol: &str,
        price: Decimal,
        ctx: &RequestContext,
    ) -> Result<Vec<String>> {
        let old_price = self.registry.set_price(symbol, price)?;
        info!(
            correlation_id = %ctx.correlation_id,
            symbol = %symbol,
            old = ?old_price,
            new = %price,
            "updated price by tick"
        );

        let messages: Vec<String> = self
            .index
            .subscribers_of(symbol)
            .map(|subscription| render(&self.registry, subscription))
            .collect();

        info!(
            correlation_id = %ctx.correlation_id,
            symbol = %symbol,
            subscription_count = messages.len(),
            "rendered tick update"
        );
        Ok(messages)
    }

    fn on_subscribe(
        &mut self,
        user: &str,
        symbol: &str,
        currency: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Vec<String>> {
        if !self.entitlements.is_entitled(user, symbol) {
            info!(
                correlation_id = %ctx.correlation_id,
                user = %user,
                symbol = %symbol,
                "missing entitlement to security"
            );
            return Ok(vec![not_entitled(user, symbol)]);
        }

        let native_currency = self.native_currency(symbol)?;
        let currency = currency.unwrap_or(&native_currency);

        if currency != native_currency && !self.entitlements.is_entitled(user, currency) {
            info!(
                correlation_id = %ctx.correlation_id,
                user = %user,
                currency = %currency,
                "missing entitlement to dependent currency"
            );
            return Ok(vec![not_entitled(user, currency)]);
        }

        let subscription = Subscription::new(user, symbol, currency);
        if self.index.exists(&subscription) {
            info!(
                correlation_id = %ctx.correlation_id,
                subscription = %subscription,
                "subscription already exists"
            );
            return Ok(vec![MSG_SUBSCRIPTION_EXISTS.to_string()]);
        }

        let notification = render(&self.registry, &subscription);
        self.index.add(subscription.clone(), &native_currency);
        debug!(
            correlation_id = %ctx.correlation_id,
            subscription = %subscription,
            topics = ?self.index.topics_of(&subscription),
            "subscription created"
        );
        info!(
            correlation_id = %ctx.correlation_id,
            content = %notification,
            "rendered subscription update"
        );
        Ok(vec![notification])
    }

    fn on_unsubscribe(
        &mut self,
        user: &str,
        symbol: &str,
        currency: Option<&str>,
        ctx: &RequestContext,
    ) -> Result<Vec<String>> {
        let native_currency = self.native_currency(symbol)?;
        let currency = currency.unwrap_or(&native_currency);
        let subscription = Subscription::new(user, symbol, currency);

        if !self.index.remove(&subscription, &native_currency) {
            info!(
                correlation_id = %ctx.correlation_id,
                subscription = %subscription,
                "subscription does not exist"
            );
            return Ok(vec![MSG_SUBSCRIPTION_MISSING.to_string()]);
        }

        info!(
            correlation_id = %ctx.correlation_id,
            subscription = %subscription,
            "removed subscription"
        );
        Ok(Vec::new())
    }

    fn native_currency(&self, symbol: &str) -> Result<String> {
        self.registry
            .native_currency(symbol)
            .map(str::to_string)
            .ok_or_else(|| MarketDataError::UnknownSymbol(symbol.to_string()))
    }

    pub fn registry(&self) -> &SecurityRegistry {
        &self.registry
    }

    pub fn index(&self) -> &SubscriptionIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn create_test_processor() -> CommandProcessor {
        let mut registry = SecurityRegistry::new("USD");
        registry.register("NOP", "CUR1");
        registry.register("SYM", "CUR1");
        registry.register("BOL", "CUR2");
        registry.register("CUR1", "USD");
        registry.register("CUR2", "USD");
        let entitlements: Entitlements = [
            (
                "user".to_string(),
                ["SYM", "NOP", "CUR2", "GHOST"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<HashSet<String>>(),
            ),
            (
                "other".to_string(),
                ["SYM"].iter().map(|s| s.to_string()).collect::<HashSet<String>>(),
            ),
        ]
        .into_iter()
        .collect();
        CommandProcessor::new(registry, entitlements)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(1)
    }

    fn subscribe(user: &str, symbol: &str, currency: Option<&str>) -> Command {
        Command::Subscribe {
            user: user.to_string(),
            symbol: symbol.to_string(),
            currency: currency.map(str::to_string),
        }
    }

    fn unsubscribe(user: &str, symbol: &str, currency: Option<&str>) -> Command {
        Command::Unsubscribe {
            user: user.to_string(),
            symbol: symbol.to_string(),
            currency: currency.map(str::to_string),
        }
    }

    fn tick(symbol: &str, price: Decimal) -> Command {
        Command::Tick {
            symbol: symbol.to_string(),
            price,
        }
    }

    #[test]
    fn test_subscribe_then_tick() {
        let mut processor = create_test_processor();
        let out = processor.execute(&subscribe("user", "SYM", None), &ctx()).unwrap();
        assert_eq!(out, vec!["user SYM CUR1"]);

        let out = processor.execute(&tick("SYM", dec!(100.00)), &ctx()).unwrap();
        assert_eq!(out, vec!["user SYM CUR1 100.00"]);
    }

    #[test]
    fn test_subscribe_not_entitled() {
        let mut processor = create_test_processor();
        let out = processor.execute(&subscribe("user", "BOL", None), &ctx()).unwrap();
        assert_eq!(out, vec!["User user is not entitled to BOL"]);

        let out = processor.execute(&subscribe("nobody", "SYM", None), &ctx()).unwrap();
        assert_eq!(out, vec!["User nobody is not entitled to SYM"]);

        let out = processor.execute(&subscribe("other", "SYM", Some("CUR2")), &ctx()).unwrap();
        assert_eq!(out, vec!["User other is not entitled to CUR2"]);
        assert!(processor.index().is_empty());
    }

    #[test]
    fn test_subscribe_native_currency_needs_no_currency_entitlement() {
        let mut processor = create_test_processor();
        let out = processor.execute(&subscribe("other", "SYM", Some("CUR1")), &ctx()).unwrap();
        assert_eq!(out, vec!["other SYM CUR1"]);
        assert!(processor.index().exists(&Subscription::new("other", "SYM", "CUR1")));
    }

    #[test]
    fn test_subscribe_duplicate() {
        let mut processor = create_test_processor();
        processor.execute(&subscribe("user", "SYM", None), &ctx()).unwrap();
        let out = processor.execute(&subscribe("user", "SYM", Some("CUR1")), &ctx()).unwrap();
        assert_eq!(out, vec![MSG_SUBSCRIPTION_EXISTS]);
        assert_eq!(processor.index().len(), 1);
    }

    #[test]
    fn test_subscribe_foreign_currency_links_three_topics() {
        let mut processor = create_test_processor();
        processor.execute(&subscribe("user", "SYM", Some("CUR2")), &ctx()).unwrap();
        let sub = Subscription::new("user", "SYM", "CUR2");
        assert_eq!(processor.index().topics_of(&sub), vec!["CUR1", "CUR2", "SYM"]);
    }

    #[test]
    fn test_subscribe_unknown_symbol() {
        let mut processor = create_test_processor();
        let err = processor.execute(&subscribe("user", "GHOST", None), &ctx()).unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownSymbol(s) if s == "GHOST"));
    }

    #[test]
    fn test_unsubscribe() {
        let mut processor = create_test_processor();
        let out = processor.execute(&unsubscribe("user", "SYM", None), &ctx()).unwrap();
        assert_eq!(out, vec![MSG_SUBSCRIPTION_MISSING]);

        processor.execute(&subscribe("user", "SYM", None), &ctx()).unwrap();
        processor.execute(&subscribe("user", "SYM", Some("CUR2")), &ctx()).unwrap();

        let out = processor.execute(&unsubscribe("user", "SYM", None), &ctx()).unwrap();
        assert!(out.is_empty());
        assert!(!processor.index().exists(&Subscription::new("user", "SYM", "CUR1")));

        let out = processor.execute(&unsubscribe("user", "SYM", Some("CUR2")), &ctx()).unwrap();
        assert!(out.is_empty());
        assert!(processor.index().is_empty());
        assert_eq!(processor.index().topic_count(), 0);

        let err = processor.execute(&unsubscribe("user", "GHOST", None), &ctx()).unwrap_err();
        assert!(matches!(err, MarketDataError::UnknownSymbol(_)));
    }

    #[test]
    fn test_tick_unknown_symbol_publishes_nothing() {
        let mut processor = create_test_processor();
        processor.execute(&subscribe("user", "SYM", None), &ctx()).unwrap();
        let err = processor.execute(&tick("NONEXISTENT", dec!(12.50)), &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown symbol: NONEXISTENT");
        assert_eq!(processor.registry().price("SYM"), None);
    }

    #[test]
    fn test_tick_without_subscribers_updates_price() {
        let mut processor = create_test_processor();
        let out = processor.execute(&tick("SYM", dec!(345.50)), &ctx()).unwrap();
        assert!(out.is_empty());
        assert_eq!(processor.registry().price("SYM"), Some(dec!(345.5)));
    }

    #[test]
    fn test_tick_fans_out_in_insertion_order() {
        let mut processor = create_test_processor();
        processor.execute(&tick("CUR1", dec!(2)), &ctx()).unwrap();
        processor.execute(&tick("CUR2", dec!(4)), &ctx()).unwrap();
        processor.execute(&subscribe("other", "SYM", None), &ctx()).unwrap();
        processor.execute(&subscribe("user", "SYM", Some("CUR2")), &ctx()).unwrap();
        processor.execute(&subscribe("user", "SYM", None), &ctx()).unwrap();

        let out = processor.execute(&tick("SYM", dec!(10)), &ctx()).unwrap();
        assert_eq!(
            out,
            vec!["other SYM CUR1 10.00", "user SYM CUR2 5.00", "user SYM CUR1 10.00"]
        );

        // same price still notifies
        let again = processor.execute(&tick("SYM", dec!(10)), &ctx()).unwrap();
        assert_eq!(again, out);
    }

    #[test]
    fn test_rate_tick_reaches_converted_subscriptions() {
        let mut processor = create_test_processor();
        processor.execute(&tick("SYM", dec!(10)), &ctx()).unwrap();
        let out = processor.execute(&subscribe("user", "SYM", Some("CUR2")), &ctx()).unwrap();
        assert_eq!(out, vec!["user SYM CUR2"]);

        let out = processor.execute(&tick("CUR1", dec!(3)), &ctx()).unwrap();
        assert_eq!(out, vec!["user SYM CUR2"]);

        let out = processor.execute(&tick("CUR2", dec!(2)), &ctx()).unwrap();
        assert_eq!(out, vec!["user SYM CUR2 15.00"]);
    }
}

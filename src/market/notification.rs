//! Notification rendering with on-the-fly currency conversion

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{SecurityRegistry, Subscription};

/// Decimal places of published prices
pub const PRICE_PRECISION: u32 = 2;

/// Convert a value between two currencies quoted against a common base
///
/// Absent if any input is absent, the target rate is zero, or the result
/// does not fit in a `Decimal`.
pub fn convert_currency(
    source_rate: Option<Decimal>,
    target_rate: Option<Decimal>,
    source_value: Option<Decimal>,
    precision: u32,
) -> Option<Decimal> {
    let (source_rate, target_rate, source_value) = (source_rate?, target_rate?, source_value?);
    if target_rate.is_zero() {
        warn!(%source_value, %source_rate, "zero target exchange rate, price omitted");
        return None;
    }

    let Some(value) = source_value.checked_mul(source_rate) else {
        warn!(%source_value, %source_rate, "currency conversion overflow, price omitted");
        return None;
    };
    let Some(converted) = value.checked_div(target_rate) else {
        warn!(%value, %target_rate, "currency conversion overflow, price omitted");
        return None;
    };
    Some(converted.round_dp(precision))
}

/// Render the notification for a subscription's current state
///
/// Format is `<user> <symbol> <currency> [<price>]`; the price field is
/// omitted when the security or either exchange rate has no price yet.
pub fn render(registry: &SecurityRegistry, subscription: &Subscription) -> String {
    let price = registry.get(&subscription.symbol).and_then(|security| {
        let price = security.price?;
        if security.currency == subscription.currency {
            return Some(price);
        }

        let source_rate = registry.price(&security.currency);
        let target_rate = registry.price(&subscription.currency);
        let converted =
            convert_currency(source_rate, target_rate, Some(price), PRICE_PRECISION);
        debug!(
            source_currency = %security.currency,
            source_rate = ?source_rate,
            source_value = %price,
            target_currency = %subscription.currency,
            target_rate = ?target_rate,
            target_value = ?converted,
            "currency conversion"
        );
        converted
    });

    match price {
        Some(price) => format!(
            "{} {:.prec$}",
            subscription,
            price.round_dp(PRICE_PRECISION),
            prec = PRICE_PRECISION as usize
        ),
        None => subscription.to_string(),
    }
}

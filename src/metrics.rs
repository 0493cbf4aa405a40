//! Service metrics
//!
//! Counters kept in a private Prometheus registry and rendered in the text
//! exposition format on demand.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::error::{MarketDataError, Result};

/// Command and notification counters for one service instance
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    commands: IntCounterVec,
    failures: IntCounterVec,
    notifications: IntCounter,
    active_subscriptions: IntGauge,
}

impl ServiceMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let commands = IntCounterVec::new(
            Opts::new("market_data_commands_total", "Commands processed by verb"),
            &["verb"],
        )?;
        let failures = IntCounterVec::new(
            Opts::new(
                "market_data_command_failures_total",
                "Commands abandoned by failure kind",
            ),
            &["kind"],
        )?;
        let notifications = IntCounter::new(
            "market_data_notifications_total",
            "Messages published to the output stream",
        )?;
        let active_subscriptions = IntGauge::new(
            "market_data_active_subscriptions",
            "Currently active subscriptions",
        )?;

        registry.register(Box::new(commands.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(notifications.clone()))?;
        registry.register(Box::new(active_subscriptions.clone()))?;

        Ok(Self {
            registry,
            commands,
            failures,
            notifications,
            active_subscriptions,
        })
    }

    pub fn record_command(&self, verb: &str) {
        self.commands.with_label_values(&[verb]).inc();
    }

    pub fn record_failure(&self, kind: &str) {
        self.failures.with_label_values(&[kind]).inc();
    }

    pub fn record_notifications(&self, count: usize) {
        self.notifications.inc_by(count as u64);
    }

    pub fn set_active_subscriptions(&self, count: usize) {
        self.active_subscriptions.set(count as i64);
    }

    pub fn commands(&self, verb: &str) -> u64 {
        self.commands.with_label_values(&[verb]).get()
    }

    pub fn failures(&self, kind: &str) -> u64 {
        self.failures.with_label_values(&[kind]).get()
    }

    pub fn notifications(&self) -> u64 {
        self.notifications.get()
    }

    /// Render all metrics in the Prometheus text format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MarketDataError::MetricsError(e.to_string()))
    }
}

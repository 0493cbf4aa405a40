//! Subscription index
//!
//! One authoritative table of live subscriptions plus a reverse index from
//! topic (a symbol or a currency code) to an insertion-ordered set of
//! subscription handles. A subscription quoted in its security's native
//! currency is linked under its symbol only; any other subscription is also
//! linked under the requested currency and the native currency, so a tick on
//! either exchange rate reaches it.

use indexmap::IndexSet;
use std::collections::HashMap;

use super::Subscription;

/// Handle into the authoritative subscription table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Active subscriptions and their topic linkage
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    active: HashMap<Subscription, SubscriptionId>,
    handles: HashMap<SubscriptionId, Subscription>,
    /// Invariant: no empty buckets
    topics: HashMap<String, IndexSet<SubscriptionId>>,
    next_id: u64,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, subscription: &Subscription) -> bool {
        self.active.contains_key(subscription)
    }

    /// Insert a new subscription and link it into its topics
    ///
    /// Returns false without touching the index if it already exists.
    pub fn add(&mut self, subscription: Subscription, native_currency: &str) -> bool {
        if self.exists(&subscription) {
            return false;
        }

        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        self.link(&subscription.symbol, id);
        if subscription.currency != native_currency {
            self.link(&subscription.currency, id);
            self.link(native_currency, id);
        }

        self.active.insert(subscription.clone(), id);
        self.handles.insert(id, subscription);
        true
    }

    /// Remove a subscription and unlink it from every candidate topic
    ///
    /// The symbol, requested currency and native currency topics are all
    /// unlinked; a topic the subscription was never linked under is left
    /// untouched. Returns false if the subscription does not exist.
    pub fn remove(&mut self, subscription: &Subscription, native_currency: &str) -> bool {
        let Some(id) = self.active.remove(subscription) else {
            return false;
        };
        self.handles.remove(&id);

        for topic in [
            subscription.symbol.as_str(),
            subscription.currency.as_str(),
            native_currency,
        ] {
            self.unlink(topic, id);
        }
        true
    }

    /// Subscriptions linked under `topic`, in insertion order
    pub fn subscribers_of<'a>(
        &'a self,
        topic: &str,
    ) -> impl Iterator<Item = &'a Subscription> + 'a {
        self.topics
            .get(topic)
            .into_iter()
            .flat_map(|bucket| bucket.iter())
            .filter_map(|id| self.handles.get(id))
    }

    /// Number of subscriptions linked under `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map(IndexSet::len).unwrap_or(0)
    }

    /// Topics a subscription is currently linked under
    pub fn topics_of(&self, subscription: &Subscription) -> Vec<&str> {
        let Some(id) = self.active.get(subscription) else {
            return Vec::new();
        };
        let mut topics: Vec<&str> = self
            .topics
            .iter()
            .filter(|(_, bucket)| bucket.contains(id))
            .map(|(topic, _)| topic.as_str())
            .collect();
        topics.sort_unstable();
        topics
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Number of active subscriptions
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn link(&mut self, topic: &str, id: SubscriptionId) {
        self.topics.entry(topic.to_string()).or_default().insert(id);
    }

    fn unlink(&mut self, topic: &str, id: SubscriptionId) {
        if let Some(bucket) = self.topics.get_mut(topic) {
            bucket.shift_remove(&id);
            if bucket.is_empty() {
                self.topics.remove(topic);
            }
        }
    }
}

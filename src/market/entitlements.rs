//! Static user entitlements

use std::collections::{HashMap, HashSet};

/// Read-only mapping from user to the symbol and currency codes they may access
#[derive(Debug, Default, Clone)]
pub struct Entitlements {
    by_user: HashMap<String, HashSet<String>>,
}

impl Entitlements {
    pub fn new(by_user: HashMap<String, HashSet<String>>) -> Self {
        Self { by_user }
    }

    /// True iff `code` is configured for `user`; unknown users hold nothing
    pub fn is_entitled(&self, user: &str, code: &str) -> bool {
        self.by_user
            .get(user)
            .map(|codes| codes.contains(code))
            .unwrap_or(false)
    }
}

impl FromIterator<(String, HashSet<String>)> for Entitlements {
    fn from_iter<I: IntoIterator<Item = (String, HashSet<String>)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_entitled() {
        let entitlements: Entitlements = [(
            "elon.musk".to_string(),
            ["TSLA", "GBP"].iter().map(|s| s.to_string()).collect::<HashSet<String>>(),
        )]
        .into_iter()
        .collect();

        assert!(entitlements.is_entitled("elon.musk", "TSLA"));
        assert!(entitlements.is_entitled("elon.musk", "GBP"));
        assert!(!entitlements.is_entitled("elon.musk", "tsla"));
        assert!(!entitlements.is_entitled("bill.gates", "TSLA"));
    }
}

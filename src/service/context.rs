//! Request-scoped context for one input line

use uuid::Uuid;

/// Correlation data carried through the processing of a single command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: Uuid,
    /// 1-based position of the line in the input stream
    pub sequence: u64,
}

impl RequestContext {
    pub fn new(sequence: u64) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_correlation_id_per_line() {
        let first = RequestContext::new(1);
        let second = RequestContext::new(2);
        assert_ne!(first.correlation_id, second.correlation_id);
        assert_eq!(second.sequence, 2);
    }
}

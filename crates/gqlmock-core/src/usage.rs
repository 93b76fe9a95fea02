//! Consumption bookkeeping for limited-use mocks

use crate::definition::UseLimit;
use crate::registry::MockId;

/// Per-context count of how often each registered mock has fired
#[derive(Debug, Clone, Default)]
pub struct UsageLedger {
    used: Vec<u32>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn used(&self, id: MockId) -> u32 {
        self.used.get(id.index()).copied().unwrap_or(0)
    }

    /// Uses left under `limit`, or `None` when unlimited
    pub fn remaining(&self, id: MockId, limit: UseLimit) -> Option<u32> {
        match limit {
            UseLimit::Unlimited => None,
            UseLimit::Times(max) => Some(max.saturating_sub(self.used(id))),
        }
    }

    pub fn is_exhausted(&self, id: MockId, limit: UseLimit) -> bool {
        self.remaining(id, limit) == Some(0)
    }

    /// Record one successful match
    pub fn consume(&mut self, id: MockId) {
        let index = id.index();
        if self.used.len() <= index {
            self.used.resize(index + 1, 0);
        }
        self.used[index] = self.used[index].saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limited_mock_exhausts() {
        let mut ledger = UsageLedger::new();
        let id = MockId::new(2);

        assert_eq!(ledger.remaining(id, UseLimit::Times(2)), Some(2));
        ledger.consume(id);
        assert!(!ledger.is_exhausted(id, UseLimit::Times(2)));
        ledger.consume(id);
        assert!(ledger.is_exhausted(id, UseLimit::Times(2)));
        assert_eq!(ledger.used(MockId::new(0)), 0);
    }

    #[test]
    fn test_unlimited_never_exhausts() {
        let mut ledger = UsageLedger::new();
        let id = MockId::new(0);
        for _ in 0..100 {
            ledger.consume(id);
        }
        assert_eq!(ledger.remaining(id, UseLimit::Unlimited), None);
        assert!(!ledger.is_exhausted(id, UseLimit::Unlimited));
        assert_eq!(ledger.used(id), 100);

        ledger.reset();
        assert_eq!(ledger.used(id), 0);
    }
}

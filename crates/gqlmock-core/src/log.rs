//! Operation log for the inspection panel
//!
//! Append-only record of every operation a rendering context dispatched,
//! matched or not. Entries carry a sequence number that strictly increases
//! in append order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operation::OperationDescriptor;
use crate::outcome::Outcome;
use crate::registry::MockId;

/// One dispatched operation and what it resolved to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the context's log, starting at 1
    pub sequence: u64,
    pub descriptor: OperationDescriptor,
    /// Registry position of the mock that answered, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<MockId>,
    pub outcome: Outcome,
    pub recorded_at: DateTime<Utc>,
}

/// Counts shown in the panel header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub simulated_failures: usize,
}

#[derive(Debug, Default)]
pub struct OperationLog {
    entries: Vec<LogEntry>,
    next_sequence: u64,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return it
    pub fn append(
        &mut self,
        descriptor: OperationDescriptor,
        matched: Option<MockId>,
        outcome: Outcome,
    ) -> &LogEntry {
        self.next_sequence += 1;
        self.entries.push(LogEntry {
            sequence: self.next_sequence,
            descriptor,
            matched,
            outcome,
            recorded_at: Utc::now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> LogStats {
        let mut stats = LogStats {
            total: self.entries.len(),
            ..LogStats::default()
        };
        for entry in &self.entries {
            if entry.matched.is_some() {
                stats.matched += 1;
            } else {
                stats.unmatched += 1;
            }
            if matches!(entry.outcome, Outcome::Failure(_)) {
                stats.simulated_failures += 1;
            }
        }
        stats
    }

    /// Drop all entries. Only a context restart calls this.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_sequence = 0;
    }
}

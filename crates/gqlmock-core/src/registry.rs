//! Ordered mock registry
//!
//! The registry is a read-only view once built: it never tracks how often a
//! mock fired. Callers pass a [`UsageLedger`] so exhausted mocks can be
//! filtered out without the registry mutating itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::definition::MockDefinition;
use crate::error::Result;
use crate::operation::OperationDescriptor;
use crate::usage::UsageLedger;

/// Position of a mock in its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MockId(usize);

impl MockId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inspection-friendly view of a registered mock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockSummary {
    pub id: MockId,
    pub operation_name: String,
    pub variables: serde_json::Value,
    /// `None` means unlimited
    pub remaining_uses: Option<u32>,
}

/// Ordered collection of mock definitions for one rendering context
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    mocks: Vec<MockDefinition>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from definitions in order, failing on the first invalid one
    pub fn from_definitions(definitions: impl IntoIterator<Item = MockDefinition>) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Validate and append a definition. Duplicates are allowed.
    pub fn register(&mut self, definition: MockDefinition) -> Result<MockId> {
        let id = MockId::new(self.mocks.len());
        definition.validate(id.index())?;
        self.mocks.push(definition);
        Ok(id)
    }

    pub fn get(&self, id: MockId) -> Option<&MockDefinition> {
        self.mocks.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.mocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MockId, &MockDefinition)> {
        self.mocks
            .iter()
            .enumerate()
            .map(|(index, mock)| (MockId::new(index), mock))
    }

    /// Unexhausted definitions with the descriptor's name and document, in order
    pub fn find_candidates<'a>(
        &'a self,
        descriptor: &'a OperationDescriptor,
        usage: &'a UsageLedger,
    ) -> impl Iterator<Item = (MockId, &'a MockDefinition)> + 'a {
        self.iter().filter(move |(id, mock)| {
            mock.request.operation_name == descriptor.operation_name()
                && &mock.request.document == descriptor.document()
                && !usage.is_exhausted(*id, mock.max_uses)
        })
    }

    /// Summaries of unexhausted definitions registered for `operation_name`
    pub fn unconsumed_for(&self, operation_name: &str, usage: &UsageLedger) -> Vec<MockSummary> {
        self.iter()
            .filter(|(id, mock)| {
                mock.request.operation_name == operation_name
                    && !usage.is_exhausted(*id, mock.max_uses)
            })
            .map(|(id, mock)| self.summarize(id, mock, usage))
            .collect()
    }

    pub fn summarize(&self, id: MockId, mock: &MockDefinition, usage: &UsageLedger) -> MockSummary {
        MockSummary {
            id,
            operation_name: mock.request.operation_name.clone(),
            variables: mock.request.variables.describe(),
            remaining_uses: usage.remaining(id, mock.max_uses),
        }
    }
}

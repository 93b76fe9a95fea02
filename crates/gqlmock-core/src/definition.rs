//! Mock definitions
//!
//! A [`MockDefinition`] pairs a request pattern with the canned outcome the
//! engine hands back when an operation matches it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{MockError, Result};
use crate::operation::{DocumentId, Variables};

/// Predicate over call-time variables. `Err` counts as "no match".
pub type PredicateFn = dyn Fn(&Variables) -> std::result::Result<bool, String> + Send + Sync;

/// Computes a result from call-time variables
pub type ResultFn = dyn Fn(&Variables) -> MockResult + Send + Sync;

/// How a mock constrains the variables of an operation
#[derive(Clone)]
pub enum VariablesMatcher {
    /// Every listed key must be present with a deep-equal value
    Values(Variables),
    /// Arbitrary check over the full variables map
    Predicate(Arc<PredicateFn>),
}

impl VariablesMatcher {
    /// Match any variables
    pub fn any() -> Self {
        Self::Values(Variables::new())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Variables) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(move |vars| Ok(f(vars))))
    }

    /// Predicate whose evaluation may fail
    pub fn try_predicate<F>(f: F) -> Self
    where
        F: Fn(&Variables) -> std::result::Result<bool, String> + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// JSON rendering used in diagnostics and log summaries
    pub fn describe(&self) -> serde_json::Value {
        match self {
            VariablesMatcher::Values(values) => serde_json::Value::Object(values.clone()),
            VariablesMatcher::Predicate(_) => serde_json::Value::String("<predicate>".to_string()),
        }
    }
}

impl Default for VariablesMatcher {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Debug for VariablesMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariablesMatcher::Values(values) => f.debug_tuple("Values").field(values).finish(),
            VariablesMatcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Request half of a mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub operation_name: String,
    pub document: DocumentId,
    pub variables: VariablesMatcher,
    pub context: Option<Variables>,
    pub extensions: Option<Variables>,
}

impl MockRequest {
    pub fn new(operation_name: impl Into<String>, document: DocumentId) -> Self {
        Self {
            operation_name: operation_name.into(),
            document,
            variables: VariablesMatcher::any(),
            context: None,
            extensions: None,
        }
    }
}

/// A GraphQL error entry inside a successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }
}

/// Response body a mock yields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockResult {
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl MockResult {
    pub fn data(data: serde_json::Value) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<GraphQlError>) -> Self {
        self.errors = errors;
        self
    }
}

/// Simulated network-level failure authored in a mock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedFailure {
    pub kind: String,
    pub message: String,
}

impl SimulatedFailure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SimulatedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// What a matched mock produces
#[derive(Clone)]
pub enum MockOutcome {
    Result(MockResult),
    Failure(SimulatedFailure),
    /// Result computed from the call-time variables
    Computed(Arc<ResultFn>),
}

impl MockOutcome {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Variables) -> MockResult + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }
}

impl fmt::Debug for MockOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockOutcome::Result(result) => f.debug_tuple("Result").field(result).finish(),
            MockOutcome::Failure(failure) => f.debug_tuple("Failure").field(failure).finish(),
            MockOutcome::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// How many times a mock may satisfy an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UseLimit {
    #[default]
    Unlimited,
    Times(u32),
}

/// A registered stand-in response for an operation
#[derive(Debug, Clone)]
pub struct MockDefinition {
    pub request: MockRequest,
    pub outcome: MockOutcome,
    pub delay: Option<Duration>,
    pub max_uses: UseLimit,
}

impl MockDefinition {
    pub fn new(request: MockRequest, outcome: MockOutcome) -> Self {
        Self {
            request,
            outcome,
            delay: None,
            max_uses: UseLimit::Unlimited,
        }
    }

    /// Mock that returns `data` for `operation_name` on `document`
    pub fn returning(
        operation_name: impl Into<String>,
        document: DocumentId,
        data: serde_json::Value,
    ) -> Self {
        Self::new(
            MockRequest::new(operation_name, document),
            MockOutcome::Result(MockResult::data(data)),
        )
    }

    /// Mock that simulates a network failure
    pub fn failing(
        operation_name: impl Into<String>,
        document: DocumentId,
        failure: SimulatedFailure,
    ) -> Self {
        Self::new(
            MockRequest::new(operation_name, document),
            MockOutcome::Failure(failure),
        )
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.request.variables = VariablesMatcher::Values(variables);
        self
    }

    pub fn with_matcher(mut self, matcher: VariablesMatcher) -> Self {
        self.request.variables = matcher;
        self
    }

    pub fn with_context(mut self, context: Variables) -> Self {
        self.request.context = Some(context);
        self
    }

    pub fn with_extensions(mut self, extensions: Variables) -> Self {
        self.request.extensions = Some(extensions);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_max_uses(mut self, uses: u32) -> Self {
        self.max_uses = UseLimit::Times(uses);
        self
    }

    /// Check structural validity. `index` is the registration position.
    pub fn validate(&self, index: usize) -> Result<()> {
        if self.request.operation_name.trim().is_empty() {
            return Err(MockError::invalid_mock(index, "operation name is empty"));
        }
        if self.request.document.as_str().is_empty() {
            return Err(MockError::invalid_mock(index, "document identity is empty"));
        }
        if self.max_uses == UseLimit::Times(0) {
            return Err(MockError::invalid_mock(index, "max_uses must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> DocumentId {
        DocumentId::new("doc-get-location")
    }

    #[test]
    fn test_default_matcher_accepts_anything() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}));
        match &def.request.variables {
            VariablesMatcher::Values(values) => assert!(values.is_empty()),
            VariablesMatcher::Predicate(_) => panic!("expected concrete values"),
        }
        assert_eq!(def.max_uses, UseLimit::Unlimited);
        assert!(def.delay.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_uses() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({})).with_max_uses(0);
        let err = def.validate(3).unwrap_err();
        assert_eq!(
            err,
            MockError::InvalidMock {
                index: 3,
                reason: "max_uses must be positive".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let def = MockDefinition::returning("  ", doc(), json!({}));
        assert!(def.validate(0).is_err());

        let def = MockDefinition::returning("GetLocation", DocumentId::new(""), json!({}));
        assert!(def.validate(0).is_err());

        let def = MockDefinition::returning("GetLocation", doc(), json!({})).with_max_uses(1);
        assert!(def.validate(0).is_ok());
    }

    #[test]
    fn test_describe_matcher() {
        let values = VariablesMatcher::Values(json!({"id": 1}).as_object().cloned().unwrap());
        assert_eq!(values.describe(), json!({"id": 1}));

        let predicate = VariablesMatcher::predicate(|_| true);
        assert_eq!(predicate.describe(), json!("<predicate>"));
        assert_eq!(format!("{predicate:?}"), "Predicate(..)");
    }

    #[test]
    fn test_mock_result_serde_skips_empty_errors() {
        let result = MockResult::data(json!({"locations": []}));
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("errors"));

        let with_errors = result.with_errors(vec![GraphQlError::new("partial failure")]);
        let json = serde_json::to_value(&with_errors).unwrap();
        assert_eq!(json["errors"][0]["message"], "partial failure");
    }

    #[test]
    fn test_simulated_failure_display() {
        let failure = SimulatedFailure::new("NETWORK_ERROR", "timeout");
        assert_eq!(failure.to_string(), "NETWORK_ERROR: timeout");
    }
}

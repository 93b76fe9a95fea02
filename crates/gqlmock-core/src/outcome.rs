//! Resolution outcomes
//!
//! Everything `resolve` can produce is a value of [`Outcome`]. Neither a
//! missing mock nor an authored network failure is an error of the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::definition::{MockResult, SimulatedFailure};
use crate::operation::Variables;
use crate::registry::MockSummary;

/// No registered mock satisfied an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedOperation {
    pub operation_name: String,
    pub variables: Variables,
    /// Registered, unexhausted mocks with the same operation name
    pub unconsumed: Vec<MockSummary>,
}

impl fmt::Display for UnmatchedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variables = serde_json::to_string(&self.variables).unwrap_or_default();
        write!(
            f,
            "No more mocked responses for the query: {} with variables {}",
            self.operation_name, variables
        )?;
        if self.unconsumed.is_empty() {
            return write!(f, "; no unconsumed mocks are registered for this operation");
        }
        write!(f, "; unconsumed mocks for this operation:")?;
        for mock in &self.unconsumed {
            let remaining = mock
                .remaining_uses
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string());
            write!(
                f,
                "\n  {} variables {} (remaining uses: {})",
                mock.id, mock.variables, remaining
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for UnmatchedOperation {}

/// Result of resolving one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Mocked response data
    Data(MockResult),
    /// Authored network failure
    Failure(SimulatedFailure),
    /// No mock matched
    Unmatched(UnmatchedOperation),
    /// No mock matched and the host mutes unmatched operations
    Empty,
    /// Context was torn down or restarted while the response was delayed
    Abandoned,
}

impl Outcome {
    pub fn is_data(&self) -> bool {
        matches!(self, Outcome::Data(_))
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, Outcome::Unmatched(_) | Outcome::Empty)
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Outcome::Data(result) => Some(&result.data),
            _ => None,
        }
    }

    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Data(_) => "data",
            Outcome::Failure(_) => "failure",
            Outcome::Unmatched(_) => "unmatched",
            Outcome::Empty => "empty",
            Outcome::Abandoned => "abandoned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MockId;
    use serde_json::json;

    #[test]
    fn test_unmatched_display_lists_unconsumed() {
        let unmatched = UnmatchedOperation {
            operation_name: "GetLocation".to_string(),
            variables: json!({"locationId": 2}).as_object().cloned().unwrap(),
            unconsumed: vec![MockSummary {
                id: MockId::new(0),
                operation_name: "GetLocation".to_string(),
                variables: json!({"locationId": 1}),
                remaining_uses: None,
            }],
        };
        let text = unmatched.to_string();
        assert!(text.contains("GetLocation"));
        assert!(text.contains(r#"{"locationId":2}"#));
        assert!(text.contains(r#"#0 variables {"locationId":1} (remaining uses: unlimited)"#));
    }

    #[test]
    fn test_unmatched_display_without_mocks() {
        let unmatched = UnmatchedOperation {
            operation_name: "GetLocations".to_string(),
            variables: Variables::new(),
            unconsumed: Vec::new(),
        };
        assert!(unmatched.to_string().contains("no unconsumed mocks"));
    }

    #[test]
    fn test_outcome_serde_tag() {
        let outcome = Outcome::Failure(SimulatedFailure::new("NETWORK_ERROR", "timeout"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["type"], "failure");
        assert_eq!(json["value"]["kind"], "NETWORK_ERROR");

        let empty = serde_json::to_value(Outcome::Empty).unwrap();
        assert_eq!(empty["type"], "empty");
    }

    #[test]
    fn test_outcome_helpers() {
        let data = Outcome::Data(MockResult::data(json!({"ok": true})));
        assert!(data.is_data());
        assert_eq!(data.data(), Some(&json!({"ok": true})));
        assert!(Outcome::Empty.is_unmatched());
        assert_eq!(Outcome::Abandoned.label(), "abandoned");
    }
}

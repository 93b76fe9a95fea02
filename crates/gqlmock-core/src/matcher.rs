//! Decides whether a registered mock applies to an outgoing operation.
//!
//! Matching is partial: a mock only constrains the keys it lists, so stories
//! need not repeat every variable a component sends.

use std::panic::{self, AssertUnwindSafe};

use crate::definition::{MockDefinition, VariablesMatcher};
use crate::operation::{CallContext, OperationDescriptor, Variables};

/// Whether `definition` satisfies `descriptor` issued with `call_context`.
///
/// Pure: neither argument is mutated, and a failing or panicking predicate
/// simply does not match.
pub fn matches(
    definition: &MockDefinition,
    descriptor: &OperationDescriptor,
    call_context: &CallContext,
) -> bool {
    let request = &definition.request;

    if request.operation_name != descriptor.operation_name()
        || &request.document != descriptor.document()
    {
        return false;
    }

    let variables_ok = match &request.variables {
        VariablesMatcher::Values(expected) => partial_match(expected, descriptor.variables()),
        VariablesMatcher::Predicate(predicate) => {
            let vars = descriptor.variables();
            match panic::catch_unwind(AssertUnwindSafe(|| predicate(vars))) {
                Ok(Ok(matched)) => matched,
                Ok(Err(reason)) => {
                    tracing::debug!(
                        operation = descriptor.operation_name(),
                        "variables predicate failed: {}",
                        reason
                    );
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        operation = descriptor.operation_name(),
                        "variables predicate panicked; treating as no match"
                    );
                    false
                }
            }
        }
    };
    if !variables_ok {
        return false;
    }

    let context_ok = request
        .context
        .as_ref()
        .map_or(true, |expected| partial_match(expected, &call_context.context));
    let extensions_ok = request
        .extensions
        .as_ref()
        .map_or(true, |expected| partial_match(expected, &call_context.extensions));

    context_ok && extensions_ok
}

/// Every key of `expected` exists in `actual` with a deep-equal value
pub fn partial_match(expected: &Variables, actual: &Variables) -> bool {
    expected
        .iter()
        .all(|(key, value)| actual.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::DocumentId;
    use serde_json::json;

    fn vars(value: serde_json::Value) -> Variables {
        value.as_object().cloned().unwrap()
    }

    fn doc() -> DocumentId {
        DocumentId::new("doc-get-location")
    }

    fn descriptor(variables: serde_json::Value) -> OperationDescriptor {
        OperationDescriptor::new("GetLocation", doc(), vars(variables))
    }

    #[test]
    fn test_partial_variables_match() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_variables(vars(json!({"id": 1})));

        assert!(matches(&def, &descriptor(json!({"id": 1, "locale": "en"})), &CallContext::new()));
        assert!(!matches(&def, &descriptor(json!({"id": 2})), &CallContext::new()));
        assert!(!matches(&def, &descriptor(json!({"locale": "en"})), &CallContext::new()));
    }

    #[test]
    fn test_values_compare_deeply() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_variables(vars(json!({"filter": {"tags": ["a", "b"], "near": null}})));

        assert!(matches(
            &def,
            &descriptor(json!({"filter": {"tags": ["a", "b"], "near": null}})),
            &CallContext::new()
        ));
        assert!(!matches(
            &def,
            &descriptor(json!({"filter": {"tags": ["b", "a"], "near": null}})),
            &CallContext::new()
        ));
        // Nested objects are compared whole, not partially
        assert!(!matches(
            &def,
            &descriptor(json!({"filter": {"tags": ["a", "b"], "near": null, "extra": 1}})),
            &CallContext::new()
        ));
    }

    #[test]
    fn test_name_and_document_must_be_equal() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}));
        let other_doc = OperationDescriptor::new("GetLocation", DocumentId::new("x"), Variables::new());
        let other_name = OperationDescriptor::new("GetLocations", doc(), Variables::new());

        assert!(matches(&def, &descriptor(json!({})), &CallContext::new()));
        assert!(!matches(&def, &other_doc, &CallContext::new()));
        assert!(!matches(&def, &other_name, &CallContext::new()));
    }

    #[test]
    fn test_predicate_errors_and_panics_do_not_match() {
        let erroring = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_matcher(VariablesMatcher::try_predicate(|_| Err("boom".to_string())));
        let panicking = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_matcher(VariablesMatcher::predicate(|vars| {
                match vars.get("locationId") {
                    Some(_) => true,
                    None => panic!("no id"),
                }
            }));

        let desc = descriptor(json!({}));
        assert!(!matches(&erroring, &desc, &CallContext::new()));
        assert!(!matches(&panicking, &desc, &CallContext::new()));
        assert!(matches(&panicking, &descriptor(json!({"locationId": 3})), &CallContext::new()));
    }

    #[test]
    fn test_matching_is_deterministic_and_pure() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_matcher(VariablesMatcher::predicate(|vars| vars.contains_key("locationId")));
        let desc = descriptor(json!({"locationId": 1}));
        let before = desc.clone();

        let first = matches(&def, &desc, &CallContext::new());
        let second = matches(&def, &desc, &CallContext::new());
        assert_eq!(first, second);
        assert_eq!(desc, before);
    }

    #[test]
    fn test_context_and_extensions_partial_match() {
        let def = MockDefinition::returning("GetLocation", doc(), json!({}))
            .with_context(vars(json!({"headers": {"authorization": "Bearer t"}})))
            .with_extensions(vars(json!({"persisted": true})));

        let full = CallContext::new()
            .with_context(vars(json!({"headers": {"authorization": "Bearer t"}, "retry": 1})))
            .with_extensions(vars(json!({"persisted": true})));
        let missing_ext = CallContext::new()
            .with_context(vars(json!({"headers": {"authorization": "Bearer t"}})));

        assert!(matches(&def, &descriptor(json!({})), &full));
        assert!(!matches(&def, &descriptor(json!({})), &missing_ext));
        assert!(!matches(&def, &descriptor(json!({})), &CallContext::new()));
    }

    #[test]
    fn test_partial_match_empty_expected() {
        assert!(partial_match(&Variables::new(), &vars(json!({"a": 1}))));
        assert!(!partial_match(&vars(json!({"a": 1})), &Variables::new()));
    }
}

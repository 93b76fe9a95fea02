//! Declarative mock file
//!
//! ```json
//! {
//!   "settings": { "unmatched": "error", "default_delay_ms": 0 },
//!   "mocks": [
//!     {
//!       "request": {
//!         "query": "query GetLocation($locationId: Int!) { location(id: $locationId) { id name } }",
//!         "variables": { "locationId": 1 }
//!       },
//!       "result": { "data": { "location": { "id": "1", "name": "Zurich" } } },
//!       "max_uses": 1
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::engine_config::EngineSettings;
use crate::definition::{
    MockDefinition, MockOutcome, MockRequest, MockResult, SimulatedFailure, UseLimit,
    VariablesMatcher,
};
use crate::error::{MockError, Result};
use crate::operation::{operation_name_from_source, DocumentId, Variables};

/// Root of a mock file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    pub settings: EngineSettings,
    #[serde(default)]
    pub mocks: Vec<MockSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSpec {
    /// Defaults to the name of the operation in `query`
    #[serde(default)]
    pub operation_name: Option<String>,
    /// Query source; its identity is derived by hashing
    #[serde(default)]
    pub query: Option<String>,
    /// Precomputed document identity, instead of `query`
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorSpec {
    #[serde(default)]
    pub kind: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MockSpec {
    pub request: RequestSpec,
    #[serde(default)]
    pub result: Option<MockResult>,
    #[serde(default)]
    pub error: Option<ErrorSpec>,
    #[serde(default)]
    pub delay_ms: Option<i64>,
    #[serde(default)]
    pub max_uses: Option<i64>,
}

impl MockConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Validate settings and turn every spec into a definition, in order
    pub fn to_definitions(&self) -> Result<Vec<MockDefinition>> {
        self.settings.validate()?;
        self.mocks
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.to_definition(index))
            .collect()
    }
}

impl MockSpec {
    pub fn to_definition(&self, index: usize) -> Result<MockDefinition> {
        let request = self.request.to_request(index)?;

        let outcome = match (&self.result, &self.error) {
            (Some(result), None) => MockOutcome::Result(result.clone()),
            (None, Some(error)) => MockOutcome::Failure(SimulatedFailure::new(
                error
                    .kind
                    .clone()
                    .unwrap_or_else(|| super::defaults::DEFAULT_FAILURE_KIND.to_string()),
                error.message.clone(),
            )),
            (Some(_), Some(_)) => {
                return Err(MockError::invalid_mock(index, "both result and error are set"))
            }
            (None, None) => {
                return Err(MockError::invalid_mock(index, "one of result or error is required"))
            }
        };

        let delay = match self.delay_ms {
            Some(ms) if ms < 0 => {
                return Err(MockError::invalid_mock(
                    index,
                    format!("delay_ms must not be negative, got {ms}"),
                ))
            }
            Some(ms) => Some(Duration::from_millis(ms as u64)),
            None => None,
        };

        let max_uses = match self.max_uses {
            None => UseLimit::Unlimited,
            Some(n) if n <= 0 => {
                return Err(MockError::invalid_mock(
                    index,
                    format!("max_uses must be positive, got {n}"),
                ))
            }
            Some(n) => UseLimit::Times(u32::try_from(n).map_err(|_| {
                MockError::invalid_mock(index, format!("max_uses is too large: {n}"))
            })?),
        };

        let definition = MockDefinition {
            request,
            outcome,
            delay,
            max_uses,
        };
        definition.validate(index)?;
        Ok(definition)
    }
}

impl RequestSpec {
    fn to_request(&self, index: usize) -> Result<MockRequest> {
        let document = match (&self.query, &self.document) {
            (Some(query), None) => DocumentId::from_source(query),
            (None, Some(document)) => DocumentId::new(document.clone()),
            (Some(_), Some(_)) => {
                return Err(MockError::invalid_mock(index, "both query and document are set"))
            }
            (None, None) => {
                return Err(MockError::invalid_mock(index, "one of query or document is required"))
            }
        };

        let operation_name = self
            .operation_name
            .clone()
            .or_else(|| self.query.as_deref().and_then(operation_name_from_source))
            .ok_or_else(|| {
                MockError::invalid_mock(index, "operation_name is missing and query has no named operation")
            })?;

        let variables = match object_field(index, "variables", &self.variables)? {
            Some(values) => VariablesMatcher::Values(values),
            None => VariablesMatcher::any(),
        };

        Ok(MockRequest {
            operation_name,
            document,
            variables,
            context: object_field(index, "context", &self.context)?,
            extensions: object_field(index, "extensions", &self.extensions)?,
        })
    }
}

fn object_field(index: usize, field: &str, value: &Option<serde_json::Value>) -> Result<Option<Variables>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) => Ok(Some(map.clone())),
        Some(other) => Err(MockError::invalid_mock(
            index,
            format!("{field} must be an object, got {other}"),
        )),
    }
}

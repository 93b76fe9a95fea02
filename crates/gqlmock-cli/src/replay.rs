//! Operation script replay
//!
//! Each line of an operations file is one JSON object describing a call a
//! component would issue. Lines are resolved in order through a single
//! rendering context whose events go to stdout.

use gqlmock_core::{
    CallContext, ContextHandle, DocumentId, LogStats, MockConfig, MockError, OperationDescriptor,
    StdoutSink, Variables,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// One scripted operation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedOperation {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub variables: Variables,
    #[serde(default)]
    pub context: Variables,
    #[serde(default)]
    pub extensions: Variables,
}

impl ScriptedOperation {
    pub fn descriptor(&self) -> Result<OperationDescriptor, MockError> {
        match (&self.query, &self.document, &self.operation_name) {
            (Some(query), None, None) => OperationDescriptor::from_source(query, self.variables.clone()),
            (Some(query), None, Some(name)) => Ok(OperationDescriptor::new(
                name.clone(),
                DocumentId::from_source(query),
                self.variables.clone(),
            )),
            (None, Some(document), Some(name)) => Ok(OperationDescriptor::new(
                name.clone(),
                DocumentId::new(document.clone()),
                self.variables.clone(),
            )),
            _ => Err(MockError::InvalidDocument(
                "operation needs a query, or a document together with operation_name".to_string(),
            )),
        }
    }

    pub fn call_context(&self) -> CallContext {
        CallContext::new()
            .with_context(self.context.clone())
            .with_extensions(self.extensions.clone())
    }
}

pub struct ReplaySummary {
    pub stats: LogStats,
}

/// Parse a JSONL operations script, skipping blank lines
pub fn parse_script(raw: &str) -> Result<Vec<ScriptedOperation>, String> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| format!("operations line {}: {e}", idx + 1))
        })
        .collect()
}

pub async fn run(mocks: &Path, operations: &Path, json_output: bool) -> Result<ReplaySummary, String> {
    let config = MockConfig::load(mocks)?;
    let raw = std::fs::read_to_string(operations)
        .map_err(|e| format!("Failed to read {}: {e}", operations.display()))?;
    let script = parse_script(&raw)?;

    let descriptors = script
        .iter()
        .enumerate()
        .map(|(idx, op)| {
            op.descriptor()
                .map(|desc| (desc, op.call_context()))
                .map_err(|e| format!("operations line {}: {e}", idx + 1))
        })
        .collect::<Result<Vec<_>, String>>()?;

    let sink = Arc::new(StdoutSink::new(json_output));
    let context = ContextHandle::from_config(&config, sink).await?;

    for (descriptor, call_context) in descriptors {
        context.resolve(descriptor, call_context).await;
    }

    let stats = context.stats().await;
    context.teardown().await;
    Ok(ReplaySummary { stats })
}

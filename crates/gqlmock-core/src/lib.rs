//! gqlmock Core Library
//!
//! Deterministic GraphQL mock resolution for components rendered in an
//! isolated explorer. A rendering context registers mocks, components issue
//! operations through [`ContextHandle::resolve`], and an inspection panel
//! reads back what happened.
//!
//! # Modules
//!
//! - [`operation`] - Operation descriptors and document identity
//! - [`definition`] - Mock definitions and outcomes
//! - [`registry`] - Ordered mock registry
//! - [`matcher`] - Mock/operation matching
//! - [`usage`] - Consumption bookkeeping for limited-use mocks
//! - [`engine`] - Rendering contexts and resolution
//! - [`outcome`] - Resolution outcomes
//! - [`log`] - Operation log
//! - [`events`] - Inspection sink trait for decoupling from panels
//! - [`config`] - Engine settings and mock files
//! - [`error`] - Error types

pub mod config;
pub mod definition;
pub mod engine;
pub mod error;
pub mod events;
pub mod log;
pub mod matcher;
pub mod operation;
pub mod outcome;
pub mod registry;
pub mod usage;

// Re-export commonly used types
pub use config::{EngineSettings, MockConfig, UnmatchedPolicy};
pub use definition::{
    GraphQlError, MockDefinition, MockOutcome, MockRequest, MockResult, SimulatedFailure, UseLimit,
    VariablesMatcher,
};
pub use engine::ContextHandle;
pub use error::{MockError, Result};
pub use events::{ChannelSink, InspectionEvent, InspectionSink, NoOpSink, StdoutSink};
pub use log::{LogEntry, LogStats, OperationLog};
pub use matcher::matches;
pub use operation::{CallContext, DocumentId, OperationDescriptor, Variables};
pub use outcome::{Outcome, UnmatchedOperation};
pub use registry::{MockId, MockRegistry, MockSummary};

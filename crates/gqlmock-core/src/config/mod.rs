//! Engine configuration
//!
//! This module defines configuration types and default values:
//! - `engine_config`: global engine settings
//! - `mock_file`: declarative mock file format
//! - `defaults`: default configuration values

pub mod defaults;
pub mod engine_config;
pub mod mock_file;

pub use engine_config::{EngineSettings, UnmatchedPolicy};
pub use mock_file::{MockConfig, MockSpec, RequestSpec};

//! Inspection Sink Trait
//!
//! Push channel from rendering contexts to whatever inspects them: a UI
//! panel, the CLI's stdout, or a test. The engine never depends on a
//! concrete frontend.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::log::LogEntry;

/// Receives lifecycle and log events from rendering contexts
#[async_trait]
pub trait InspectionSink: Send + Sync {
    /// A context started with `mock_count` registered mocks
    async fn context_started(&self, context_id: &str, mock_count: usize) -> Result<(), String>;

    /// An entry was appended to a context's log
    async fn entry_logged(&self, context_id: &str, entry: &LogEntry) -> Result<(), String>;

    /// A context restarted with a fresh registry and an empty log
    async fn context_restarted(&self, context_id: &str, mock_count: usize) -> Result<(), String>;

    /// A context was torn down
    async fn context_torn_down(&self, context_id: &str) -> Result<(), String>;
}

/// No-op sink for tests or hosts without an inspection panel
#[derive(Default, Clone)]
pub struct NoOpSink;

#[async_trait]
impl InspectionSink for NoOpSink {
    async fn context_started(&self, _context_id: &str, _mock_count: usize) -> Result<(), String> {
        Ok(())
    }

    async fn entry_logged(&self, _context_id: &str, _entry: &LogEntry) -> Result<(), String> {
        Ok(())
    }

    async fn context_restarted(&self, _context_id: &str, _mock_count: usize) -> Result<(), String> {
        Ok(())
    }

    async fn context_torn_down(&self, _context_id: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Stdout sink for CLI mode
#[derive(Default, Clone)]
pub struct StdoutSink {
    /// Whether to print in JSON format
    pub json_output: bool,
}

impl StdoutSink {
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }
}

#[async_trait]
impl InspectionSink for StdoutSink {
    async fn context_started(&self, context_id: &str, mock_count: usize) -> Result<(), String> {
        if self.json_output {
            println!(
                r#"{{"event":"context_started","context_id":"{context_id}","mocks":{mock_count}}}"#
            );
        } else {
            println!("Context started: {context_id} ({mock_count} mocks)");
        }
        Ok(())
    }

    async fn entry_logged(&self, context_id: &str, entry: &LogEntry) -> Result<(), String> {
        if self.json_output {
            let entry_json = serde_json::to_string(entry).map_err(|e| e.to_string())?;
            println!(
                r#"{{"event":"entry_logged","context_id":"{context_id}","entry":{entry_json}}}"#
            );
        } else {
            println!("{}", format_entry(entry));
        }
        Ok(())
    }

    async fn context_restarted(&self, context_id: &str, mock_count: usize) -> Result<(), String> {
        if self.json_output {
            println!(
                r#"{{"event":"context_restarted","context_id":"{context_id}","mocks":{mock_count}}}"#
            );
        } else {
            println!("Context restarted: {context_id} ({mock_count} mocks)");
        }
        Ok(())
    }

    async fn context_torn_down(&self, context_id: &str) -> Result<(), String> {
        if self.json_output {
            println!(r#"{{"event":"context_torn_down","context_id":"{context_id}"}}"#);
        } else {
            println!("Context torn down: {context_id}");
        }
        Ok(())
    }
}

/// Event forwarded by [`ChannelSink`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InspectionEvent {
    ContextStarted { context_id: String, mock_count: usize },
    EntryLogged { context_id: String, entry: LogEntry },
    ContextRestarted { context_id: String, mock_count: usize },
    ContextTornDown { context_id: String },
}

/// Forwards events over an unbounded channel, e.g. to a panel task
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<InspectionEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<InspectionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: InspectionEvent) -> Result<(), String> {
        self.tx
            .send(event)
            .map_err(|_| "inspection channel closed".to_string())
    }
}

#[async_trait]
impl InspectionSink for ChannelSink {
    async fn context_started(&self, context_id: &str, mock_count: usize) -> Result<(), String> {
        self.send(InspectionEvent::ContextStarted {
            context_id: context_id.to_string(),
            mock_count,
        })
    }

    async fn entry_logged(&self, context_id: &str, entry: &LogEntry) -> Result<(), String> {
        self.send(InspectionEvent::EntryLogged {
            context_id: context_id.to_string(),
            entry: entry.clone(),
        })
    }

    async fn context_restarted(&self, context_id: &str, mock_count: usize) -> Result<(), String> {
        self.send(InspectionEvent::ContextRestarted {
            context_id: context_id.to_string(),
            mock_count,
        })
    }

    async fn context_torn_down(&self, context_id: &str) -> Result<(), String> {
        self.send(InspectionEvent::ContextTornDown {
            context_id: context_id.to_string(),
        })
    }
}

/// One-line text rendering of a log entry
pub fn format_entry(entry: &LogEntry) -> String {
    let matched = entry
        .matched
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let variables = serde_json::to_string(entry.descriptor.variables()).unwrap_or_default();
    format!(
        "[{}] #{} {} {} {} -> {}",
        entry.recorded_at.format("%H:%M:%S%.3f"),
        entry.sequence,
        entry.descriptor.operation_name(),
        variables,
        matched,
        entry.outcome.label()
    )
}

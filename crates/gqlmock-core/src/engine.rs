//! Resolution engine
//!
//! A [`ContextHandle`] owns everything one rendering context needs: the mock
//! registry, consumption counters and the operation log. Handles are cheap to
//! clone and are passed explicitly to whatever issues operations.
//!
//! Matching, consumption and log appends happen under one per-context lock,
//! so concurrent `resolve` calls behave as if processed in some total order.
//! Log entries reach the inspection sink under the same lock, in sequence
//! order; a sink must not call back into the context. The lock is never
//! held across a simulated delay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::config::{EngineSettings, MockConfig, UnmatchedPolicy};
use crate::definition::{MockDefinition, MockOutcome};
use crate::error::{MockError, Result};
use crate::events::{InspectionSink, NoOpSink};
use crate::log::{LogEntry, LogStats, OperationLog};
use crate::matcher;
use crate::operation::{CallContext, OperationDescriptor, Variables};
use crate::outcome::{Outcome, UnmatchedOperation};
use crate::registry::{MockId, MockRegistry, MockSummary};
use crate::usage::UsageLedger;

/// Bumped on every restart so delayed resolutions from a previous
/// registry can tell they are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active(u64),
    TornDown,
}

struct ContextState {
    registry: MockRegistry,
    usage: UsageLedger,
    log: OperationLog,
}

struct ContextInner {
    id: String,
    settings: EngineSettings,
    state: Mutex<ContextState>,
    lifecycle: watch::Sender<Lifecycle>,
    sink: Arc<dyn InspectionSink>,
}

/// Mock that won the match, captured so the lock can be released
struct Selection {
    id: MockId,
    outcome: MockOutcome,
    delay: Duration,
}

/// Handle to one rendering context
#[derive(Clone)]
pub struct ContextHandle {
    inner: Arc<ContextInner>,
}

impl ContextHandle {
    /// Start a context with no inspection sink
    pub async fn start(definitions: Vec<MockDefinition>, settings: EngineSettings) -> Result<Self> {
        Self::start_with_sink(definitions, settings, Arc::new(NoOpSink)).await
    }

    /// Start a context from a declarative mock file
    pub async fn from_config(config: &MockConfig, sink: Arc<dyn InspectionSink>) -> Result<Self> {
        let definitions = config.to_definitions()?;
        Self::start_with_sink(definitions, config.settings.clone(), sink).await
    }

    /// Validate everything, then start. Nothing is registered if any mock is invalid.
    pub async fn start_with_sink(
        definitions: Vec<MockDefinition>,
        settings: EngineSettings,
        sink: Arc<dyn InspectionSink>,
    ) -> Result<Self> {
        settings.validate()?;
        let registry = MockRegistry::from_definitions(definitions)?;
        let mock_count = registry.len();
        let (lifecycle, _) = watch::channel(Lifecycle::Active(0));

        let handle = Self {
            inner: Arc::new(ContextInner {
                id: uuid::Uuid::new_v4().to_string(),
                settings,
                state: Mutex::new(ContextState {
                    registry,
                    usage: UsageLedger::new(),
                    log: OperationLog::new(),
                }),
                lifecycle,
                sink,
            }),
        };

        tracing::info!(
            "Started rendering context {} with {} mocks",
            handle.id(),
            mock_count
        );
        if let Err(e) = handle.inner.sink.context_started(handle.id(), mock_count).await {
            tracing::warn!("Failed to emit context started: {}", e);
        }
        Ok(handle)
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    pub fn is_torn_down(&self) -> bool {
        self.lifecycle() == Lifecycle::TornDown
    }

    fn lifecycle(&self) -> Lifecycle {
        *self.inner.lifecycle.borrow()
    }

    /// Resolve one operation against the registered mocks.
    ///
    /// Never fails: unmatched operations and simulated failures come back
    /// as [`Outcome`] values. Returns [`Outcome::Abandoned`] without logging
    /// when the context is torn down or restarted before the outcome is ready.
    pub async fn resolve(&self, descriptor: OperationDescriptor, call_context: CallContext) -> Outcome {
        let (generation, selection) = {
            let mut guard = self.inner.state.lock().await;
            let state = &mut *guard;

            let generation = match self.lifecycle() {
                Lifecycle::Active(generation) => generation,
                Lifecycle::TornDown => return Outcome::Abandoned,
            };

            let selection = state
                .registry
                .find_candidates(&descriptor, &state.usage)
                .find(|(_, mock)| matcher::matches(mock, &descriptor, &call_context))
                .map(|(id, mock)| Selection {
                    id,
                    outcome: mock.outcome.clone(),
                    delay: mock
                        .delay
                        .unwrap_or_else(|| self.inner.settings.default_delay()),
                });

            let Some(selection) = selection else {
                let outcome = self.unmatched_outcome(state, &descriptor);
                let entry = state.log.append(descriptor, None, outcome.clone()).clone();
                self.emit_entry(&entry).await;
                return outcome;
            };

            state.usage.consume(selection.id);
            tracing::debug!(
                operation = descriptor.operation_name(),
                mock = %selection.id,
                "matched mock"
            );

            if selection.delay.is_zero() {
                let outcome = into_outcome(selection.outcome, descriptor.variables());
                let entry = state
                    .log
                    .append(descriptor, Some(selection.id), outcome.clone())
                    .clone();
                self.emit_entry(&entry).await;
                return outcome;
            }

            (generation, selection)
        };

        let mut lifecycle = self.inner.lifecycle.subscribe();
        let cancelled = tokio::select! {
            _ = tokio::time::sleep(selection.delay) => false,
            _ = lifecycle.wait_for(|l| *l != Lifecycle::Active(generation)) => true,
        };
        if cancelled {
            tracing::debug!(
                operation = descriptor.operation_name(),
                "context ended during simulated delay; discarding outcome"
            );
            return Outcome::Abandoned;
        }

        let outcome = into_outcome(selection.outcome, descriptor.variables());
        let mut state = self.inner.state.lock().await;
        if self.lifecycle() != Lifecycle::Active(generation) {
            return Outcome::Abandoned;
        }
        let entry = state
            .log
            .append(descriptor, Some(selection.id), outcome.clone())
            .clone();
        self.emit_entry(&entry).await;
        outcome
    }

    fn unmatched_outcome(&self, state: &ContextState, descriptor: &OperationDescriptor) -> Outcome {
        let unconsumed = state
            .registry
            .unconsumed_for(descriptor.operation_name(), &state.usage);
        let unmatched = UnmatchedOperation {
            operation_name: descriptor.operation_name().to_string(),
            variables: descriptor.variables().clone(),
            unconsumed,
        };
        tracing::warn!("{}", unmatched);

        match self.inner.settings.unmatched {
            UnmatchedPolicy::Error => Outcome::Unmatched(unmatched),
            UnmatchedPolicy::Muted => Outcome::Empty,
        }
    }

    async fn emit_entry(&self, entry: &LogEntry) {
        if let Err(e) = self.inner.sink.entry_logged(self.id(), entry).await {
            tracing::warn!("Failed to emit log entry: {}", e);
        }
    }

    /// Full operation log, oldest first
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.inner.state.lock().await.log.entries().to_vec()
    }

    pub async fn stats(&self) -> LogStats {
        self.inner.state.lock().await.log.stats()
    }

    /// Registered mocks with their remaining uses
    pub async fn mocks(&self) -> Vec<MockSummary> {
        let state = self.inner.state.lock().await;
        state
            .registry
            .iter()
            .map(|(id, mock)| state.registry.summarize(id, mock, &state.usage))
            .collect()
    }

    /// Begin a new render in this context: swap in `definitions`, reset
    /// consumption and clear the log. Pending delayed resolutions are
    /// abandoned. On a configuration error the running context is untouched.
    pub async fn restart(&self, definitions: Vec<MockDefinition>) -> Result<()> {
        let registry = MockRegistry::from_definitions(definitions)?;
        let mock_count = registry.len();
        {
            let mut state = self.inner.state.lock().await;
            let generation = match self.lifecycle() {
                Lifecycle::Active(generation) => generation,
                Lifecycle::TornDown => return Err(MockError::ContextTornDown(self.id().to_string())),
            };
            state.registry = registry;
            state.usage.reset();
            state.log.clear();
            self.inner
                .lifecycle
                .send_replace(Lifecycle::Active(generation + 1));
        }

        tracing::info!(
            "Restarted rendering context {} with {} mocks",
            self.id(),
            mock_count
        );
        if let Err(e) = self.inner.sink.context_restarted(self.id(), mock_count).await {
            tracing::warn!("Failed to emit context restarted: {}", e);
        }
        Ok(())
    }

    /// End the context. Pending delayed resolutions are abandoned and later
    /// calls resolve to [`Outcome::Abandoned`]. The log stays readable.
    pub async fn teardown(&self) {
        {
            let _state = self.inner.state.lock().await;
            if self.lifecycle() == Lifecycle::TornDown {
                return;
            }
            self.inner.lifecycle.send_replace(Lifecycle::TornDown);
        }

        tracing::info!("Tore down rendering context {}", self.id());
        if let Err(e) = self.inner.sink.context_torn_down(self.id()).await {
            tracing::warn!("Failed to emit context torn down: {}", e);
        }
    }
}

impl fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextHandle")
            .field("id", &self.inner.id)
            .field("settings", &self.inner.settings)
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}

fn into_outcome(outcome: MockOutcome, variables: &Variables) -> Outcome {
    match outcome {
        MockOutcome::Result(result) => Outcome::Data(result),
        MockOutcome::Failure(failure) => Outcome::Failure(failure),
        MockOutcome::Computed(compute) => Outcome::Data(compute(variables)),
    }
}

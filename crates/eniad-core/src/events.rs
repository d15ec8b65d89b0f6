//! Structured coordination events
//!
//! The router and fallback resolvers report diagnostics through an injectable
//! sink instead of bare log lines, so tests can assert on emitted events.

use crate::types::{EngineId, RequestKind, Tier};

/// Diagnostic events emitted by the coordination layer
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinationEvent {
    /// A request was routed; `engine` is the engine that actually produced
    /// the result (`None` for static knowledge and failures)
    Dispatch {
        kind: RequestKind,
        policy: &'static str,
        engine: Option<EngineId>,
    },
    /// A fallback tier failed and the resolver moved to the next one
    TierTransition {
        kind: RequestKind,
        from: Tier,
        to: Option<Tier>,
        reason: String,
    },
    /// An engine outside the allowed set produced a result. Diagnostic only:
    /// never converts a successful answer into a failure.
    PolicyViolation {
        kind: RequestKind,
        engine: EngineId,
        allowed: &'static [EngineId],
    },
    /// The combiner fell back to the retrieval-only result
    CombinerFallback { reason: String },
}

/// Sink for coordination events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: CoordinationEvent);
}

/// Default sink: forwards events to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: CoordinationEvent) {
        match &event {
            CoordinationEvent::Dispatch {
                kind,
                policy,
                engine,
            } => {
                let engine = engine.map(|e| e.as_str()).unwrap_or("none");
                tracing::info!(%kind, %policy, engine, "request served");
            }
            CoordinationEvent::TierTransition {
                kind,
                from,
                to,
                reason,
            } => {
                let to = to.map(|t| t.as_str()).unwrap_or("exhausted");
                tracing::warn!(%kind, %from, to, %reason, "fallback tier transition");
            }
            CoordinationEvent::PolicyViolation {
                kind,
                engine,
                allowed,
            } => {
                tracing::warn!(%kind, %engine, ?allowed, "separation policy violation");
            }
            CoordinationEvent::CombinerFallback { reason } => {
                tracing::warn!(%reason, "combiner fell back to retrieval-only result");
            }
        }
    }
}

/// Sink that records events in memory, for inspection in tests
#[derive(Debug, Default)]
pub struct MemorySink {
    events: std::sync::Mutex<Vec<CoordinationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CoordinationEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn violations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CoordinationEvent::PolicyViolation { .. }))
            .count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: CoordinationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

//! Tiered fallback resolution
//!
//! A resolver owns an ordered list of tier handlers and walks them until one
//! produces a successful result. Resolution never returns an error to the
//! caller: an exhausted chain yields a well-formed failure result carrying a
//! localized message.

mod retrieval;
mod search;

pub use retrieval::{LocalSimulationTier, StaticKnowledgeTier};
pub use search::SearchSimulationTier;

use crate::engines::Engine;
use crate::error::Result;
use crate::events::{CoordinationEvent, EventSink};
use crate::types::{unavailable_message, EngineResult, Query, RequestKind, ResultMetadata, Tier};
use async_trait::async_trait;
use std::sync::Arc;

/// One tier of a fallback chain
#[async_trait]
pub trait TierHandler: Send + Sync {
    fn tier(&self) -> Tier;

    /// Try to answer. `Err` or an unsuccessful result both move the resolver
    /// to the next tier.
    async fn attempt(&self, query: &Query) -> Result<EngineResult>;
}

/// Remote-backend tier wrapping an engine adapter directly
pub struct RemoteEngineTier {
    engine: Arc<dyn Engine>,
}

impl RemoteEngineTier {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TierHandler for RemoteEngineTier {
    fn tier(&self) -> Tier {
        Tier::RemoteBackend
    }

    async fn attempt(&self, query: &Query) -> Result<EngineResult> {
        self.engine.ask(query).await
    }
}

/// Ordered fallback chain for one request kind
pub struct FallbackResolver {
    kind: RequestKind,
    tiers: Vec<Box<dyn TierHandler>>,
}

impl FallbackResolver {
    pub fn new(kind: RequestKind, tiers: Vec<Box<dyn TierHandler>>) -> Self {
        Self { kind, tiers }
    }

    /// Walk the tiers in order; first successful result wins and gets its
    /// tier recorded in metadata. Exhaustion yields a localized failure.
    pub async fn resolve(&self, query: &Query, events: &dyn EventSink) -> EngineResult {
        for (i, handler) in self.tiers.iter().enumerate() {
            let tier = handler.tier();
            match handler.attempt(query).await {
                Ok(mut result) if result.success => {
                    result.metadata.tier = Some(tier);
                    return result;
                }
                Ok(result) => {
                    self.emit_transition(events, i, tier, describe_refusal(&result));
                }
                Err(e) => {
                    self.emit_transition(events, i, tier, e.to_string());
                }
            }
        }

        EngineResult::failure(
            unavailable_message(query.language),
            ResultMetadata {
                error: Some("all_tiers_exhausted".to_string()),
                ..ResultMetadata::default()
            },
        )
    }

    fn emit_transition(&self, events: &dyn EventSink, index: usize, from: Tier, reason: String) {
        let to = self.tiers.get(index + 1).map(|h| h.tier());
        events.emit(CoordinationEvent::TierTransition {
            kind: self.kind,
            from,
            to,
            reason,
        });
    }
}

fn describe_refusal(result: &EngineResult) -> String {
    result
        .metadata
        .error
        .clone()
        .unwrap_or_else(|| "tier reported failure".to_string())
}

//! Search-family fallback tier below the remote search agent
//!
//! Simulates a site search over the seeded document index. The tier returns
//! findings only; answer synthesis is a separate hosted-LLM pass owned by the
//! router so the separation policy holds for the whole family.

use crate::config::RELEVANCE_THRESHOLD;
use crate::error::{EniadError, Result};
use crate::knowledge::{DocumentIndex, SITE_URL};
use crate::types::{EngineResult, Query, ResultMetadata, Source, Tier};
use async_trait::async_trait;

pub struct SearchSimulationTier {
    index: DocumentIndex,
}

impl SearchSimulationTier {
    pub fn new(index: DocumentIndex) -> Self {
        Self { index }
    }
}

#[async_trait]
impl super::TierHandler for SearchSimulationTier {
    fn tier(&self) -> Tier {
        Tier::LocalSimulation
    }

    async fn attempt(&self, query: &Query) -> Result<EngineResult> {
        let hits: Vec<_> = self
            .index
            .search(&query.text)
            .into_iter()
            .filter(|hit| hit.score >= RELEVANCE_THRESHOLD)
            .take(query.options.max_sources)
            .collect();

        if hits.is_empty() {
            return Err(EniadError::semantic(
                "search-simulation",
                "no site document reaches the relevance threshold",
            ));
        }

        let documents_used = hits.len();
        // Canned findings carry the document's static relevance hint, not the
        // query score: the simulation stands in for a site search whose
        // ranking the gateway does not compute.
        let sources = hits
            .into_iter()
            .map(|h| Source::new(&h.document.title, SITE_URL, h.document.static_hint))
            .collect();

        Ok(EngineResult {
            success: true,
            answer: None,
            sources,
            metadata: ResultMetadata {
                provider: Some("search-simulation".to_string()),
                documents_used: Some(documents_used),
                ..ResultMetadata::default()
            },
        })
    }
}

//! Coordination router
//!
//! Parses the caller-supplied request kind, dispatches to the right engine
//! family through its fallback resolver, and enforces the strict separation
//! policy: retrieval requests stay on the local/retrieval family, search
//! requests stay on the hosted-LLM family. Violations are reported as events
//! and never convert a successful answer into a failure.

mod combine;

pub use combine::{Combiner, Synthesizer, APPROACH_COMBINED, APPROACH_RAG_ONLY};

use crate::config::Config;
use crate::engines::{
    HostedLlmEngine, LocalModelEngine, RagBackendEngine, SearchAgentEngine,
};
use crate::error::Result;
use crate::events::{CoordinationEvent, EventSink};
use crate::fallback::{
    FallbackResolver, LocalSimulationTier, RemoteEngineTier, SearchSimulationTier,
    StaticKnowledgeTier, TierHandler,
};
use crate::knowledge::DocumentIndex;
use crate::types::{
    unavailable_message, unknown_kind_message, EngineId, EngineResult, Language, Query,
    RequestKind, ResultMetadata, Source,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Policy tag stamped on every routed result
const STRICT_SEPARATION: &str = "strict-separation";

#[async_trait]
impl Synthesizer for HostedLlmEngine {
    async fn synthesize(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> Option<String> {
        Some(self.model().to_string())
    }
}

pub struct Router {
    retrieval: FallbackResolver,
    search: FallbackResolver,
    combiner: Combiner,
    synthesizer: Option<Arc<dyn Synthesizer>>,
    events: Arc<dyn EventSink>,
}

impl Router {
    /// Assemble a router from prebuilt resolvers. Used directly by tests;
    /// production goes through [`Router::from_config`].
    pub fn new(
        retrieval: FallbackResolver,
        search: FallbackResolver,
        synthesizer: Option<Arc<dyn Synthesizer>>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            retrieval,
            search,
            combiner: Combiner::new(synthesizer.clone()),
            synthesizer,
            events,
        }
    }

    /// Build the full production router: remote adapters first, seeded local
    /// simulation second, static knowledge last, for both families.
    pub fn from_config(config: &Config, events: Arc<dyn EventSink>) -> Result<Self> {
        let hosted = match HostedLlmEngine::new(config.hosted.clone()) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(e) => {
                tracing::warn!(error = %e, "hosted LLM unavailable, search synthesis disabled");
                None
            }
        };
        let local = Arc::new(LocalModelEngine::new(config.local_model.clone())?);
        let rag = Arc::new(RagBackendEngine::new(config.rag.clone())?);
        let sma = Arc::new(SearchAgentEngine::new(config.sma.clone())?);
        let index = DocumentIndex::seeded();

        let retrieval = FallbackResolver::new(
            RequestKind::Retrieval,
            vec![
                Box::new(RemoteEngineTier::new(rag)) as Box<dyn TierHandler>,
                Box::new(LocalSimulationTier::new(index.clone(), Some(local))),
                Box::new(StaticKnowledgeTier::new()),
            ],
        );
        let search = FallbackResolver::new(
            RequestKind::Search,
            vec![
                Box::new(RemoteEngineTier::new(sma)) as Box<dyn TierHandler>,
                Box::new(SearchSimulationTier::new(index)),
                Box::new(StaticKnowledgeTier::new()),
            ],
        );

        let synthesizer = hosted.map(|h| h as Arc<dyn Synthesizer>);
        Ok(Self::new(retrieval, search, synthesizer, events))
    }

    /// Route a request given the caller-supplied kind string.
    ///
    /// An unknown kind fails fast with `unknown_request_type` and touches no
    /// adapter. Resolution itself never errors: every path returns a
    /// well-formed result.
    pub async fn route_request(&self, kind: &str, query: &Query) -> EngineResult {
        match RequestKind::parse(kind) {
            Some(kind) => self.dispatch(kind, query).await,
            None => {
                tracing::warn!(kind, "rejecting unknown request kind");
                EngineResult::failure(
                    unknown_kind_message(query.language),
                    ResultMetadata {
                        error: Some("unknown_request_type".to_string()),
                        ..ResultMetadata::default()
                    },
                )
            }
        }
    }

    async fn dispatch(&self, kind: RequestKind, query: &Query) -> EngineResult {
        let result = match kind {
            RequestKind::Retrieval => self.dispatch_retrieval(query).await,
            RequestKind::Search => self.dispatch_search(query).await,
        };
        let result = self.finalize(kind, result);

        self.events.emit(CoordinationEvent::Dispatch {
            kind,
            policy: kind.policy_name(),
            engine: result.metadata.engine,
        });
        result
    }

    async fn dispatch_retrieval(&self, query: &Query) -> EngineResult {
        let resolved = self.retrieval.resolve(query, self.events.as_ref()).await;

        if query.options.search_enabled {
            if let Some(search) = &query.options.search_results {
                return self
                    .combiner
                    .combine(query, resolved, search, self.events.as_ref())
                    .await;
            }
        }
        resolved
    }

    async fn dispatch_search(&self, query: &Query) -> EngineResult {
        let mut resolved = self.search.resolve(query, self.events.as_ref()).await;
        if !resolved.success || resolved.answer.is_some() {
            // Failure, or a tier that already produced its own answer
            return resolved;
        }

        let prompt = findings_prompt(query, &resolved.sources);
        match self.synthesize(&prompt).await {
            Ok(answer) => {
                resolved.answer = Some(answer);
                resolved.metadata.engine = Some(EngineId::HostedLlm);
                resolved.metadata.model = self
                    .synthesizer
                    .as_ref()
                    .and_then(|s| s.model_name())
                    .or(resolved.metadata.model);
                resolved
            }
            Err(e) => {
                tracing::warn!(error = %e, "search synthesis failed");
                EngineResult::failure(
                    unavailable_message(query.language),
                    ResultMetadata {
                        tier: resolved.metadata.tier,
                        error: Some("synthesis_failed".to_string()),
                        ..ResultMetadata::default()
                    },
                )
            }
        }
    }

    async fn synthesize(&self, prompt: &str) -> Result<String> {
        let synthesizer = self.synthesizer.as_ref().ok_or_else(|| {
            crate::error::EniadError::Config("no synthesis model configured".to_string())
        })?;
        synthesizer.synthesize(prompt).await
    }

    /// Stamp policy tags and check engine separation. The check is diagnostic
    /// only: a successful answer from a disallowed engine is reported, never
    /// rejected.
    fn finalize(&self, kind: RequestKind, mut result: EngineResult) -> EngineResult {
        if let Some(engine) = result.metadata.engine {
            let allowed = kind.allowed_engines();
            let combined = result.metadata.approach.as_deref() == Some(APPROACH_COMBINED);
            if !allowed.contains(&engine) && !combined {
                self.events.emit(CoordinationEvent::PolicyViolation {
                    kind,
                    engine,
                    allowed,
                });
            }
        }
        result.metadata.policy = Some(STRICT_SEPARATION.to_string());
        let coordination = if result.metadata.approach.as_deref() == Some(APPROACH_COMBINED) {
            APPROACH_COMBINED
        } else {
            kind.policy_name()
        };
        result.metadata.coordination_policy = Some(coordination.to_string());
        result
    }
}

fn findings_prompt(query: &Query, sources: &[Source]) -> String {
    let findings = sources
        .iter()
        .map(|s| format!("- {} ({})", s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n");
    match query.language {
        Language::Ar => format!(
            "أنت مساعد المدرسة الوطنية للذكاء الاصطناعي والرقمي. أجب عن السؤال \
             اعتماداً على نتائج البحث التالية فقط.\n\nالسؤال: {}\n\nنتائج البحث:\n{}",
            query.text, findings
        ),
        _ => format!(
            "Tu es l'assistant de l'ENIAD. Réponds à la question en te basant \
             uniquement sur les résultats de recherche suivants.\n\n\
             Question : {}\n\nRésultats de recherche :\n{}",
            query.text, findings
        ),
    }
}

//! Combined-answer synthesis
//!
//! When both retrieval and search modes are active, the combiner fuses the
//! retrieval answer with the search findings through one hosted-LLM synthesis
//! call. The retrieval-only answer is the safety net: any precondition or
//! synthesis failure returns it tagged as a fallback rather than failing the
//! whole request.

use crate::error::Result;
use crate::events::{CoordinationEvent, EventSink};
use crate::types::{EngineId, EngineResult, Language, Query, Source};
use async_trait::async_trait;
use std::sync::Arc;

/// Number of search findings quoted in the synthesis prompt
const PROMPT_SOURCE_COUNT: usize = 3;

pub const APPROACH_COMBINED: &str = "combined-sma-rag";
pub const APPROACH_RAG_ONLY: &str = "rag-only-fallback";

/// One-shot text synthesis, implemented by the hosted LLM adapter
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str) -> Result<String>;

    /// Model label recorded in combined-result metadata
    fn model_name(&self) -> Option<String> {
        None
    }
}

pub struct Combiner {
    synthesizer: Option<Arc<dyn Synthesizer>>,
}

impl Combiner {
    pub fn new(synthesizer: Option<Arc<dyn Synthesizer>>) -> Self {
        Self { synthesizer }
    }

    /// Fuse a successful retrieval result with prior search findings.
    ///
    /// Preconditions: both inputs succeeded and the search result carries at
    /// least one source. When any precondition fails, or the synthesis call
    /// itself fails, the retrieval result is returned tagged
    /// `rag-only-fallback` and a [`CoordinationEvent::CombinerFallback`] is
    /// emitted.
    pub async fn combine(
        &self,
        query: &Query,
        retrieval: EngineResult,
        search: &EngineResult,
        events: &dyn EventSink,
    ) -> EngineResult {
        if !retrieval.success {
            events.emit(CoordinationEvent::CombinerFallback {
                reason: "retrieval result unsuccessful".to_string(),
            });
            return rag_only(retrieval);
        }
        if !search.success {
            events.emit(CoordinationEvent::CombinerFallback {
                reason: "search result unsuccessful".to_string(),
            });
            return rag_only(retrieval);
        }
        if search.sources.is_empty() {
            events.emit(CoordinationEvent::CombinerFallback {
                reason: "search result carries no sources".to_string(),
            });
            return rag_only(retrieval);
        }

        let prompt = build_prompt(query, &retrieval, search);
        match self.run_synthesis(&prompt).await {
            Ok(answer) => {
                let mut combined = EngineResult {
                    success: true,
                    answer: Some(answer),
                    // Retrieval sources first, search sources after. Duplicate
                    // URLs are kept: both halves legitimately cite the site.
                    sources: Vec::with_capacity(retrieval.sources.len() + search.sources.len()),
                    metadata: retrieval.metadata.clone(),
                };
                combined.sources.extend(retrieval.sources);
                combined.sources.extend(search.sources.iter().cloned());
                combined.metadata.engine = Some(EngineId::HostedLlm);
                combined.metadata.model = self
                    .synthesizer
                    .as_ref()
                    .and_then(|s| s.model_name())
                    .or(combined.metadata.model);
                combined.metadata.approach = Some(APPROACH_COMBINED.to_string());
                combined
            }
            Err(e) => {
                events.emit(CoordinationEvent::CombinerFallback {
                    reason: e.to_string(),
                });
                let mut result = rag_only(retrieval);
                result.metadata.sma_failed = true;
                result
            }
        }
    }

    async fn run_synthesis(&self, prompt: &str) -> Result<String> {
        let synthesizer = self.synthesizer.as_ref().ok_or_else(|| {
            crate::error::EniadError::Config("no synthesis model configured".to_string())
        })?;
        synthesizer.synthesize(prompt).await
    }
}

fn rag_only(mut retrieval: EngineResult) -> EngineResult {
    retrieval.metadata.approach = Some(APPROACH_RAG_ONLY.to_string());
    retrieval
}

fn build_prompt(query: &Query, retrieval: &EngineResult, search: &EngineResult) -> String {
    let findings = search
        .sources
        .iter()
        .take(PROMPT_SOURCE_COUNT)
        .map(|s: &Source| format!("- {} ({})", s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n");
    let rag_answer = retrieval.answer.as_deref().unwrap_or_default();

    match query.language {
        Language::Ar => format!(
            "أنت مساعد المدرسة الوطنية للذكاء الاصطناعي والرقمي. ادمج الإجابة \
             الوثائقية التالية مع نتائج البحث في إجابة واحدة موجزة.\n\n\
             السؤال: {}\n\nالإجابة الوثائقية:\n{}\n\nنتائج البحث:\n{}",
            query.text, rag_answer, findings
        ),
        _ => format!(
            "Tu es l'assistant de l'ENIAD. Fusionne la réponse documentaire \
             suivante avec les résultats de recherche en une seule réponse \
             concise et sourcée.\n\nQuestion : {}\n\nRéponse documentaire :\n{}\n\n\
             Résultats de recherche :\n{}",
            query.text, rag_answer, findings
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::types::{ResultMetadata, Tier};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSynthesizer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Synthesizer for CountingSynthesizer {
        async fn synthesize(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::error::EniadError::transient("hosted-llm", "timeout"))
            } else {
                Ok("réponse combinée".to_string())
            }
        }

        fn model_name(&self) -> Option<String> {
            Some("gemini-1.5-flash".to_string())
        }
    }

    fn retrieval_result() -> EngineResult {
        EngineResult {
            success: true,
            answer: Some("réponse documentaire".to_string()),
            sources: vec![Source::new("doc", "https://eniad.ump.ma/fr", 0.8)],
            metadata: ResultMetadata {
                engine: Some(EngineId::LocalModel),
                tier: Some(Tier::LocalSimulation),
                ..ResultMetadata::default()
            },
        }
    }

    fn search_result(sources: usize) -> EngineResult {
        EngineResult {
            success: true,
            answer: None,
            sources: (0..sources)
                .map(|i| Source::new(format!("hit {i}"), "https://eniad.ump.ma/fr", 0.6))
                .collect(),
            metadata: ResultMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_combined_answer_concatenates_sources_in_order() {
        let synth = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let combiner = Combiner::new(Some(synth.clone()));
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        let combined = combiner
            .combine(&query, retrieval_result(), &search_result(2), &sink)
            .await;

        assert!(combined.success);
        assert_eq!(combined.metadata.approach.as_deref(), Some(APPROACH_COMBINED));
        assert_eq!(combined.metadata.engine, Some(EngineId::HostedLlm));
        assert_eq!(synth.calls.load(Ordering::SeqCst), 1);
        // Retrieval source first, search sources after, duplicates kept
        assert_eq!(combined.sources.len(), 3);
        assert_eq!(combined.sources[0].title, "doc");
        assert_eq!(combined.sources[1].title, "hit 0");
    }

    #[tokio::test]
    async fn test_empty_search_sources_short_circuits_synthesis() {
        let synth = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let combiner = Combiner::new(Some(synth.clone()));
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        let result = combiner
            .combine(&query, retrieval_result(), &search_result(0), &sink)
            .await;

        assert!(result.success);
        assert_eq!(result.metadata.approach.as_deref(), Some(APPROACH_RAG_ONLY));
        assert!(!result.metadata.sma_failed);
        assert_eq!(synth.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            sink.events()
                .iter()
                .filter(|e| matches!(e, CoordinationEvent::CombinerFallback { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_failed_search_result_never_reaches_synthesis() {
        let synth = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let combiner = Combiner::new(Some(synth.clone()));
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        // Unsuccessful search result that still carries a source
        let mut search = search_result(1);
        search.success = false;

        let result = combiner
            .combine(&query, retrieval_result(), &search, &sink)
            .await;

        assert!(result.success);
        assert_eq!(result.metadata.approach.as_deref(), Some(APPROACH_RAG_ONLY));
        assert_eq!(synth.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            sink.events()
                .iter()
                .filter(|e| matches!(e, CoordinationEvent::CombinerFallback { .. }))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn test_failed_retrieval_result_is_tagged_rag_only() {
        let synth = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let combiner = Combiner::new(Some(synth.clone()));
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        let mut retrieval = retrieval_result();
        retrieval.success = false;

        let result = combiner
            .combine(&query, retrieval, &search_result(2), &sink)
            .await;

        assert!(!result.success);
        assert_eq!(result.metadata.approach.as_deref(), Some(APPROACH_RAG_ONLY));
        assert_eq!(synth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_falls_back_to_retrieval_only() {
        let synth = Arc::new(CountingSynthesizer {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let combiner = Combiner::new(Some(synth));
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        let result = combiner
            .combine(&query, retrieval_result(), &search_result(2), &sink)
            .await;

        assert!(result.success);
        assert_eq!(result.metadata.approach.as_deref(), Some(APPROACH_RAG_ONLY));
        assert!(result.metadata.sma_failed);
        assert_eq!(result.answer.as_deref(), Some("réponse documentaire"));
    }

    #[tokio::test]
    async fn test_missing_synthesizer_behaves_like_synthesis_failure() {
        let combiner = Combiner::new(None);
        let sink = MemorySink::new();
        let query = Query::new("question", Language::Fr);

        let result = combiner
            .combine(&query, retrieval_result(), &search_result(1), &sink)
            .await;

        assert!(result.success);
        assert!(result.metadata.sma_failed);
    }
}

//! Retrieval-family fallback tiers below the remote backend
//!
//! Local simulation ranks the in-memory document index; the relevance gate
//! decides success, and generation through the local model server is only an
//! embellishment on top of the matched documents. Static knowledge is the
//! terminal tier shared with the search family.

use crate::config::RELEVANCE_THRESHOLD;
use crate::engines::LocalModelEngine;
use crate::error::{EniadError, Result};
use crate::knowledge::{DocumentIndex, ScoredDocument, StaticKnowledge, SITE_URL};
use crate::types::{EngineId, EngineResult, Language, Query, ResultMetadata, Source, Tier};
use async_trait::async_trait;
use std::sync::Arc;

/// Local-simulation tier: in-memory index ranking, optionally polished by the
/// local model server.
pub struct LocalSimulationTier {
    index: DocumentIndex,
    model: Option<Arc<LocalModelEngine>>,
}

impl LocalSimulationTier {
    pub fn new(index: DocumentIndex, model: Option<Arc<LocalModelEngine>>) -> Self {
        Self { index, model }
    }

    fn relevant_documents(&self, query: &Query) -> Vec<ScoredDocument> {
        self.index
            .search(&query.text)
            .into_iter()
            .filter(|hit| hit.score >= RELEVANCE_THRESHOLD)
            .take(query.options.max_sources)
            .collect()
    }

    /// Answer templated directly from the best-matching document, used when
    /// the local model server is absent or unreachable.
    fn templated_answer(top: &ScoredDocument, language: Language) -> String {
        match language {
            Language::Ar => format!("{}\n\n{}", top.document.title, top.document.content),
            _ => format!(
                "D'après la documentation ENIAD ({}) :\n\n{}",
                top.document.title, top.document.content
            ),
        }
    }

    async fn generated_answer(&self, query: &Query, hits: &[ScoredDocument]) -> Option<(String, String)> {
        let model = self.model.as_ref()?;
        let context = hits
            .iter()
            .map(|h| format!("- {}: {}", h.document.title, h.document.content))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Tu es l'assistant de l'ENIAD. Réponds à la question en te basant \
             uniquement sur le contexte suivant.\n\nContexte:\n{context}\n\nQuestion: {}",
            query.text
        );
        model.generate(&prompt).await.ok()
    }
}

#[async_trait]
impl super::TierHandler for LocalSimulationTier {
    fn tier(&self) -> Tier {
        Tier::LocalSimulation
    }

    async fn attempt(&self, query: &Query) -> Result<EngineResult> {
        let hits = self.relevant_documents(query);
        let top = hits.first().ok_or_else(|| {
            EniadError::semantic("local-simulation", "no document reaches the relevance threshold")
        })?;

        let (answer, model) = match self.generated_answer(query, &hits).await {
            Some((text, model)) => (text, Some(model)),
            None => (Self::templated_answer(top, query.language), None),
        };

        let sources = hits
            .iter()
            .map(|h| Source::new(&h.document.title, SITE_URL, h.score))
            .collect::<Vec<_>>();

        Ok(EngineResult {
            success: true,
            answer: Some(answer),
            metadata: ResultMetadata {
                engine: Some(EngineId::LocalModel),
                provider: Some("local-simulation".to_string()),
                model,
                documents_used: Some(hits.len()),
                ..ResultMetadata::default()
            },
            sources,
        })
    }
}

/// Terminal tier backed by the static knowledge base
pub struct StaticKnowledgeTier {
    kb: StaticKnowledge,
}

impl StaticKnowledgeTier {
    pub fn new() -> Self {
        Self {
            kb: StaticKnowledge::new(),
        }
    }
}

impl Default for StaticKnowledgeTier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl super::TierHandler for StaticKnowledgeTier {
    fn tier(&self) -> Tier {
        Tier::StaticKnowledge
    }

    async fn attempt(&self, query: &Query) -> Result<EngineResult> {
        let answer = self
            .kb
            .answer(&query.text, query.language)
            .ok_or_else(|| EniadError::semantic("static-knowledge", "no topic keyword matched"))?;

        Ok(EngineResult {
            success: true,
            answer: Some(answer.answer),
            sources: answer.sources,
            metadata: ResultMetadata {
                provider: Some("static-knowledge".to_string()),
                ..ResultMetadata::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::TierHandler;

    #[tokio::test]
    async fn test_local_simulation_answers_relevant_query() {
        let tier = LocalSimulationTier::new(DocumentIndex::seeded(), None);
        let query = Query::new("Quelles sont les conditions d'admission?", Language::Fr);
        let result = tier.attempt(&query).await.unwrap();

        assert!(result.success);
        assert_eq!(result.metadata.provider.as_deref(), Some("local-simulation"));
        assert_eq!(result.metadata.engine, Some(EngineId::LocalModel));
        // Model server absent: templated answer cites the document content
        assert!(result.answer.unwrap().contains("baccalauréat"));
        assert!(!result.sources.is_empty());
        assert!(result.sources.iter().all(|s| s.url == SITE_URL));
    }

    #[tokio::test]
    async fn test_local_simulation_rejects_irrelevant_query() {
        let tier = LocalSimulationTier::new(DocumentIndex::seeded(), None);
        let query = Query::new("xyzzy plugh", Language::Fr);
        let err = tier.attempt(&query).await.err().unwrap();
        assert!(err.is_tier_fallthrough());
    }

    #[tokio::test]
    async fn test_local_simulation_respects_max_sources() {
        let tier = LocalSimulationTier::new(DocumentIndex::seeded(), None);
        let mut query = Query::new("formation intelligence artificielle ENIAD", Language::Fr);
        query.options.max_sources = 2;
        if let Ok(result) = tier.attempt(&query).await {
            assert!(result.sources.len() <= 2);
        }
    }

    #[tokio::test]
    async fn test_static_tier_matches_topic() {
        let tier = StaticKnowledgeTier::new();
        let query = Query::new("comment se passe l'inscription?", Language::Fr);
        let result = tier.attempt(&query).await.unwrap();
        assert!(result.success);
        assert_eq!(result.metadata.provider.as_deref(), Some("static-knowledge"));
        assert!(result.answer.unwrap().contains("Mars à Juin"));
    }

    #[tokio::test]
    async fn test_static_tier_fails_without_keyword() {
        let tier = StaticKnowledgeTier::new();
        let query = Query::new("météo demain", Language::Fr);
        assert!(tier.attempt(&query).await.is_err());
    }
}

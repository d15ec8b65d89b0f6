//! RAG backend adapter
//!
//! Talks to the document-indexing API. Successful HTTP responses still carry
//! a `signal` field; a 2xx body without the expected signal is a semantic
//! failure and triggers the next fallback tier.

use crate::config::{RagBackendConfig, HEALTH_TIMEOUT_SECS};
use crate::error::{EniadError, Result};
use crate::types::{EngineId, EngineResult, EngineStatus, Query, ResultMetadata, Source};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANSWER_SIGNAL: &str = "rag_answer_success";
const SEARCH_SIGNAL: &str = "vectordb_search_success";

pub struct RagBackendEngine {
    http_client: reqwest::Client,
    config: RagBackendConfig,
}

#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    #[serde(default)]
    signal: String,
    answer: Option<String>,
    #[serde(default)]
    chunks: Vec<Chunk>,
    model: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    text: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    signal: String,
    #[serde(default)]
    results: Vec<Chunk>,
}

#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    text: String,
    #[serde(default)]
    score: f32,
    source: Option<String>,
}

impl RagBackendEngine {
    pub fn new(config: RagBackendConfig) -> Result<Self> {
        if !config.project_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(EniadError::Config(format!(
                "RAG project id must be alphanumeric: {}",
                config.project_id
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!(
            "{}/api/v1/nlp/index/{}/{}",
            self.config.url.trim_end_matches('/'),
            suffix,
            self.config.project_id
        )
    }

    /// Semantic search against the vector index, without answer generation.
    pub async fn search(&self, text: &str) -> Result<Vec<Source>> {
        let request = SearchRequest {
            text,
            limit: self.config.answer_limit,
        };
        let response = self
            .http_client
            .post(self.endpoint("search"))
            .json(&request)
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::RetrievalBackend.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::RetrievalBackend.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: SearchResponse = response.json().await?;
        if body.signal != SEARCH_SIGNAL {
            return Err(EniadError::semantic(
                EngineId::RetrievalBackend.as_str(),
                format!("unexpected search signal: {}", body.signal),
            ));
        }

        Ok(body
            .results
            .into_iter()
            .map(|c| {
                Source::new(
                    c.text.chars().take(80).collect::<String>(),
                    c.source.unwrap_or_default(),
                    c.score,
                )
            })
            .collect())
    }
}

#[async_trait]
impl super::Engine for RagBackendEngine {
    fn id(&self) -> EngineId {
        EngineId::RetrievalBackend
    }

    async fn ask(&self, query: &Query) -> Result<EngineResult> {
        let request = AnswerRequest {
            question: &query.text,
            limit: self.config.answer_limit,
        };
        let response = self
            .http_client
            .post(self.endpoint("answer"))
            .json(&request)
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::RetrievalBackend.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::RetrievalBackend.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: AnswerResponse = response.json().await?;
        if body.signal != ANSWER_SIGNAL {
            return Err(EniadError::semantic(
                EngineId::RetrievalBackend.as_str(),
                format!("unexpected answer signal: {}", body.signal),
            ));
        }
        let answer = body.answer.filter(|a| !a.trim().is_empty()).ok_or_else(|| {
            EniadError::semantic(EngineId::RetrievalBackend.as_str(), "missing 'answer' field")
        })?;

        let documents_used = body.chunks.len();
        let mut sources: Vec<Source> = body
            .chunks
            .into_iter()
            .map(|c| {
                Source::new(
                    c.text.chars().take(80).collect::<String>(),
                    c.source.unwrap_or_default(),
                    c.score,
                )
            })
            .collect();
        // Some backend deployments answer without chunks; backfill citations
        // from the vector-search endpoint, best effort.
        if sources.is_empty() {
            if let Ok(found) = self.search(&query.text).await {
                sources = found;
            }
        }

        Ok(EngineResult {
            success: true,
            answer: Some(answer),
            sources,
            metadata: ResultMetadata {
                engine: Some(EngineId::RetrievalBackend),
                provider: Some("rag-backend".to_string()),
                model: body.model,
                documents_used: Some(documents_used),
                ..ResultMetadata::default()
            },
        })
    }

    async fn status(&self) -> EngineStatus {
        let url = format!("{}/api/v1/nlp/index/status", self.config.url.trim_end_matches('/'));
        let probe = self
            .http_client
            .get(url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => EngineStatus {
                available: true,
                model: None,
                detail: Some(format!("project {}", self.config.project_id)),
            },
            Ok(response) => EngineStatus {
                available: false,
                model: None,
                detail: Some(format!("HTTP {}", response.status())),
            },
            Err(e) => EngineStatus {
                available: false,
                model: None,
                detail: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id_validation() {
        let bad = RagBackendConfig {
            project_id: "eniad-project".to_string(),
            ..RagBackendConfig::default()
        };
        assert!(matches!(
            RagBackendEngine::new(bad),
            Err(EniadError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_layout() {
        let engine = RagBackendEngine::new(RagBackendConfig {
            url: "http://localhost:8004/".to_string(),
            project_id: "eniadproject".to_string(),
            answer_limit: 5,
            timeout_secs: 30,
        })
        .unwrap();
        assert_eq!(
            engine.endpoint("answer"),
            "http://localhost:8004/api/v1/nlp/index/answer/eniadproject"
        );
        assert_eq!(
            engine.endpoint("search"),
            "http://localhost:8004/api/v1/nlp/index/search/eniadproject"
        );
    }
}

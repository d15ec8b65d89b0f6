//! Web-search multi-agent adapter
//!
//! Returns raw findings from the search backend. The findings are synthesized
//! into an answer afterwards by the hosted LLM, which keeps the search family
//! inside its separation policy.

use crate::config::{SmaBackendConfig, HEALTH_TIMEOUT_SECS};
use crate::error::{EniadError, Result};
use crate::types::{EngineId, EngineResult, EngineStatus, Language, Query, ResultMetadata, Source};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct SearchAgentEngine {
    http_client: reqwest::Client,
    config: SmaBackendConfig,
}

/// One raw search hit as reported by the agent backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchFinding {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub score: f32,
}

impl SearchFinding {
    pub fn to_source(&self) -> Source {
        Source::new(&self.title, &self.url, self.score)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    language: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchFinding>,
}

impl SearchAgentEngine {
    pub fn new(config: SmaBackendConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Run a site search and return the raw findings.
    pub async fn search(&self, query: &str, language: Language) -> Result<Vec<SearchFinding>> {
        let url = format!("{}/sma/search", self.config.url.trim_end_matches('/'));
        let request = SearchRequest {
            query,
            language: language.as_str(),
            max_results: self.config.max_results,
        };

        let mut builder = self.http_client.post(url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::SearchAgent.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::SearchAgent.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: SearchResponse = response.json().await?;
        if body.results.is_empty() {
            return Err(EniadError::semantic(
                EngineId::SearchAgent.as_str(),
                "search returned no results",
            ));
        }
        Ok(body.results)
    }
}

#[async_trait]
impl super::Engine for SearchAgentEngine {
    fn id(&self) -> EngineId {
        EngineId::SearchAgent
    }

    async fn ask(&self, query: &Query) -> Result<EngineResult> {
        let findings = self.search(&query.text, query.language).await?;
        let sources: Vec<Source> = findings.iter().map(SearchFinding::to_source).collect();
        Ok(EngineResult {
            success: true,
            answer: None,
            sources,
            metadata: ResultMetadata {
                engine: Some(EngineId::SearchAgent),
                provider: Some("sma-backend".to_string()),
                documents_used: Some(findings.len()),
                ..ResultMetadata::default()
            },
        })
    }

    async fn status(&self) -> EngineStatus {
        let url = format!("{}/health", self.config.url.trim_end_matches('/'));
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
                detail: None,
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
    fn test_finding_to_source_clamps_score() {
        let finding = SearchFinding {
            title: "ENIAD".to_string(),
            url: "https://eniad.ump.ma/fr".to_string(),
            snippet: String::new(),
            score: 2.5,
        };
        assert_eq!(finding.to_source().relevance, 1.0);
    }
}

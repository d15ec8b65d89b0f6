//! Hosted LLM gateway adapter (Gemini-style generative-language REST API)
//!
//! Reserved for the search family by the separation policy. A missing API key
//! is a configuration error at construction time: the adapter is then
//! permanently unavailable rather than failing per-request.

use crate::config::{HostedLlmConfig, HEALTH_TIMEOUT_SECS};
use crate::error::{EniadError, Result};
use crate::types::{EngineId, EngineResult, EngineStatus, Query, ResultMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct HostedLlmEngine {
    http_client: reqwest::Client,
    config: HostedLlmConfig,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl HostedLlmEngine {
    pub fn new(config: HostedLlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| EniadError::Config("hosted LLM API key not configured".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.url.trim_end_matches('/'),
            self.config.model,
            self.api_key
        )
    }

    /// One raw generation call. Used both for direct answers and for the
    /// combined-synthesis prompt built by the router.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .http_client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::HostedLlm.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::HostedLlm.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty());

        text.ok_or_else(|| {
            EniadError::semantic(EngineId::HostedLlm.as_str(), "response carries no candidate text")
        })
    }
}

#[async_trait]
impl super::Engine for HostedLlmEngine {
    fn id(&self) -> EngineId {
        EngineId::HostedLlm
    }

    async fn ask(&self, query: &Query) -> Result<EngineResult> {
        let answer = self.generate(&query.text).await?;
        Ok(EngineResult {
            success: true,
            answer: Some(answer),
            sources: Vec::new(),
            metadata: ResultMetadata {
                engine: Some(EngineId::HostedLlm),
                provider: Some("gemini".to_string()),
                model: Some(self.config.model.clone()),
                ..ResultMetadata::default()
            },
        })
    }

    async fn status(&self) -> EngineStatus {
        // A list-models call with a short timeout stands in for a health check;
        // the API exposes no dedicated health endpoint.
        let url = format!(
            "{}/models?key={}",
            self.config.url.trim_end_matches('/'),
            self.api_key
        );
        let probe = self
            .http_client
            .get(url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => EngineStatus {
                available: true,
                model: Some(self.config.model.clone()),
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
    fn test_missing_api_key_is_config_error() {
        let config = HostedLlmConfig {
            api_key: None,
            ..HostedLlmConfig::default()
        };
        let err = HostedLlmEngine::new(config).err().unwrap();
        assert!(matches!(err, EniadError::Config(_)));
        assert!(!err.is_tier_fallthrough());
    }

    #[test]
    fn test_generate_url_shape() {
        let config = HostedLlmConfig {
            url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            api_key: Some("k".to_string()),
            ..HostedLlmConfig::default()
        };
        let engine = HostedLlmEngine::new(config).unwrap();
        let url = engine.generate_url();
        assert!(url.contains("/v1beta/models/"));
        assert!(url.ends_with(":generateContent?key=k"));
    }
}

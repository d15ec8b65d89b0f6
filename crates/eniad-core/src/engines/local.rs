//! Local model server adapter (Ollama)
//!
//! Retrieval-family engine. Model selection prefers the configured model when
//! it is installed, then the smaller fallback model, then whatever the server
//! reports first.

use crate::config::{LocalModelConfig, HEALTH_TIMEOUT_SECS};
use crate::error::{EniadError, Result};
use crate::types::{EngineId, EngineResult, EngineStatus, Query, ResultMetadata};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct LocalModelEngine {
    http_client: reqwest::Client,
    config: LocalModelConfig,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

impl LocalModelEngine {
    pub fn new(config: LocalModelConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    async fn installed_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.config.url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(url)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::LocalModel.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::LocalModel.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let tags: TagsResponse = response.json().await?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Pick the best installed model: configured first, fallback second,
    /// otherwise the first one the server lists.
    pub fn select_model(&self, installed: &[String]) -> Option<String> {
        for preferred in [&self.config.model, &self.config.fallback_model] {
            if installed.iter().any(|m| m == preferred) {
                return Some(preferred.clone());
            }
        }
        installed.first().cloned()
    }

    /// One raw generation call against the selected model.
    pub async fn generate(&self, prompt: &str) -> Result<(String, String)> {
        let installed = self.installed_models().await?;
        let model = self.select_model(&installed).ok_or_else(|| {
            EniadError::semantic(EngineId::LocalModel.as_str(), "no models installed")
        })?;

        let url = format!("{}/api/generate", self.config.url.trim_end_matches('/'));
        let request = GenerateRequest {
            model: &model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EniadError::transient(EngineId::LocalModel.as_str(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(EniadError::transient(
                EngineId::LocalModel.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: GenerateResponse = response.json().await?;
        if body.response.trim().is_empty() {
            return Err(EniadError::semantic(
                EngineId::LocalModel.as_str(),
                "empty generation response",
            ));
        }
        Ok((body.response, model))
    }
}

#[async_trait]
impl super::Engine for LocalModelEngine {
    fn id(&self) -> EngineId {
        EngineId::LocalModel
    }

    async fn ask(&self, query: &Query) -> Result<EngineResult> {
        let (answer, model) = self.generate(&query.text).await?;
        Ok(EngineResult {
            success: true,
            answer: Some(answer),
            sources: Vec::new(),
            metadata: ResultMetadata {
                engine: Some(EngineId::LocalModel),
                provider: Some("ollama-direct".to_string()),
                model: Some(model),
                ..ResultMetadata::default()
            },
        })
    }

    async fn status(&self) -> EngineStatus {
        match self.installed_models().await {
            Ok(installed) => EngineStatus {
                available: true,
                model: self.select_model(&installed),
                detail: Some(format!("{} model(s) installed", installed.len())),
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

    fn engine() -> LocalModelEngine {
        LocalModelEngine::new(LocalModelConfig {
            url: "http://localhost:11434".to_string(),
            model: "llama3:8b-instruct-q4_K_M".to_string(),
            fallback_model: "llama3.2:1b".to_string(),
            timeout_secs: 30,
        })
        .unwrap()
    }

    #[test]
    fn test_select_model_prefers_configured() {
        let e = engine();
        let installed = vec![
            "llama3.2:1b".to_string(),
            "llama3:8b-instruct-q4_K_M".to_string(),
        ];
        assert_eq!(e.select_model(&installed).as_deref(), Some("llama3:8b-instruct-q4_K_M"));
    }

    #[test]
    fn test_select_model_fallback_then_first() {
        let e = engine();
        let only_fallback = vec!["llama3.2:1b".to_string()];
        assert_eq!(e.select_model(&only_fallback).as_deref(), Some("llama3.2:1b"));

        let other = vec!["mistral:7b".to_string()];
        assert_eq!(e.select_model(&other).as_deref(), Some("mistral:7b"));

        assert_eq!(e.select_model(&[]), None);
    }
}

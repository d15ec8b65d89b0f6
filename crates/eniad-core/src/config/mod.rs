//! Configuration management
//!
//! Endpoints, credentials and timeouts for the four external engines. Every
//! field has an environment-variable fallback so the gateway runs without a
//! config file. Tier timeouts and the relevance threshold are deliberate
//! constants, not tunables.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relevance threshold a document must reach for the local-simulation tier to
/// count as a success (0-1 scale).
pub const RELEVANCE_THRESHOLD: f32 = 0.3;

/// Timeout for health probes, seconds. Probes must stay cheap.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Hosted LLM gateway (Gemini-style API), reserved for the search family
    #[serde(default)]
    pub hosted: HostedLlmConfig,

    /// Local model server (Ollama), retrieval family
    #[serde(default)]
    pub local_model: LocalModelConfig,

    /// Retrieval-augmented-generation backend
    #[serde(default)]
    pub rag: RagBackendConfig,

    /// Web-search-agent backend
    #[serde(default)]
    pub sma: SmaBackendConfig,
}

/// Hosted LLM gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedLlmConfig {
    /// Base URL of the generative-language REST API
    pub url: String,

    /// Model used for chat generation and combined synthesis
    #[serde(default = "default_hosted_model")]
    pub model: String,

    /// API key. Absent key makes the adapter permanently unavailable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Generation timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for HostedLlmConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ENIAD_HOSTED_LLM_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            model: default_hosted_model(),
            api_key: std::env::var("ENIAD_HOSTED_LLM_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|k| !k.is_empty()),
            timeout_secs: default_generation_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Local model server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalModelConfig {
    /// Base URL of the Ollama server
    pub url: String,

    /// Preferred generation model
    #[serde(default = "default_local_model")]
    pub model: String,

    /// Model used when the preferred one is not installed
    #[serde(default = "default_local_fallback_model")]
    pub fallback_model: String,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ENIAD_OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: default_local_model(),
            fallback_model: default_local_fallback_model(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// RAG backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagBackendConfig {
    /// Base URL of the RAG API server
    pub url: String,

    /// Project identifier in the RAG backend (alphanumeric only)
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Number of chunks requested per answer
    #[serde(default = "default_answer_limit")]
    pub answer_limit: usize,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for RagBackendConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ENIAD_RAG_API_URL")
                .unwrap_or_else(|_| "http://localhost:8004".to_string()),
            project_id: default_project_id(),
            answer_limit: default_answer_limit(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Web-search-agent backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmaBackendConfig {
    /// Base URL of the SMA service
    pub url: String,

    /// Optional bearer token
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum results requested per search
    #[serde(default = "default_sma_max_results")]
    pub max_results: usize,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for SmaBackendConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("ENIAD_SMA_API_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            api_key: std::env::var("ENIAD_SMA_API_KEY").ok().filter(|k| !k.is_empty()),
            max_results: default_sma_max_results(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_hosted_model() -> String {
    std::env::var("ENIAD_HOSTED_LLM_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string())
}

fn default_local_model() -> String {
    std::env::var("ENIAD_OLLAMA_MODEL").unwrap_or_else(|_| "llama3:8b-instruct-q4_K_M".to_string())
}

fn default_local_fallback_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_project_id() -> String {
    std::env::var("ENIAD_RAG_PROJECT").unwrap_or_else(|_| "eniadproject".to_string())
}

fn default_answer_limit() -> usize {
    5
}

fn default_sma_max_results() -> usize {
    20
}

fn default_generation_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.4
}

impl Config {
    /// Load config from default path, falling back to env-derived defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_endpoints() {
        let config = Config::default();
        assert!(!config.local_model.url.is_empty());
        assert!(!config.rag.url.is_empty());
        assert!(!config.sma.url.is_empty());
        assert!(config.hosted.url.starts_with("https://"));
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.rag.project_id, config.rag.project_id);
        assert_eq!(parsed.hosted.model, config.hosted.model);
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        std::fs::write(&path, "rag:\n  url: http://rag.test:8004\n  project_id: demo\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rag.url, "http://rag.test:8004");
        assert_eq!(config.rag.project_id, "demo");

        let missing = Config::load_from(&dir.path().join("absent.yml")).unwrap();
        assert!(!missing.local_model.url.is_empty());
    }

    #[test]
    fn test_partial_yaml_uses_field_defaults() {
        let parsed: RagBackendConfig =
            serde_yaml::from_str("url: http://rag.internal:8004").unwrap();
        assert_eq!(parsed.url, "http://rag.internal:8004");
        assert_eq!(parsed.answer_limit, 5);
    }
}

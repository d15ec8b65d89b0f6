//! Shared data model for the coordination layer
//!
//! Engine identity and request kinds are closed enums: the separation policy
//! (which engine family may serve which request kind) is a compile-time table
//! on [`RequestKind`], not a set of free-form strings.

use serde::{Deserialize, Serialize};

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    Ar,
    En,
}

impl Language {
    /// Detect the language of a query text.
    ///
    /// Any character in the Arabic Unicode block means Arabic; every other
    /// (Latin) text maps to French, the interface default.
    pub fn detect(text: &str) -> Self {
        if text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
            Language::Ar
        } else {
            Language::Fr
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::Ar => "ar",
            Language::En => "en",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = crate::error::EniadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            "en" => Ok(Language::En),
            other => Err(crate::error::EniadError::InvalidInput(format!(
                "unknown language: {other}"
            ))),
        }
    }
}

/// Closed set of engine identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineId {
    /// Hosted LLM gateway (Gemini-style REST API)
    HostedLlm,
    /// Local language-model server (Ollama)
    LocalModel,
    /// Retrieval-augmented-generation backend
    RetrievalBackend,
    /// Web-search multi-agent backend
    SearchAgent,
}

impl EngineId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineId::HostedLlm => "hosted-llm",
            EngineId::LocalModel => "local-model",
            EngineId::RetrievalBackend => "retrieval-backend",
            EngineId::SearchAgent => "search-agent",
        }
    }

    pub fn all() -> [EngineId; 4] {
        [
            EngineId::HostedLlm,
            EngineId::LocalModel,
            EngineId::RetrievalBackend,
            EngineId::SearchAgent,
        ]
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request kinds accepted by the coordination router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Must be served by the local/retrieval engine family only
    Retrieval,
    /// Must be served by the hosted-LLM family only
    Search,
}

impl RequestKind {
    /// Parse a caller-supplied kind string. `None` means the caller passed an
    /// unknown kind and the router must fail fast without touching adapters.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "retrieval" | "rag" => Some(RequestKind::Retrieval),
            "search" | "sma" => Some(RequestKind::Search),
            _ => None,
        }
    }

    /// Separation policy: engines allowed to produce a result for this kind.
    pub fn allowed_engines(&self) -> &'static [EngineId] {
        match self {
            RequestKind::Retrieval => &[EngineId::LocalModel, EngineId::RetrievalBackend],
            RequestKind::Search => &[EngineId::HostedLlm],
        }
    }

    /// Coordination policy tag recorded in result metadata.
    pub fn policy_name(&self) -> &'static str {
        match self {
            RequestKind::Retrieval => "rag-ollama-only",
            RequestKind::Search => "sma-gemini-only",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Retrieval => "retrieval",
            RequestKind::Search => "search",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fallback tiers, in strict order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    RemoteBackend,
    LocalSimulation,
    StaticKnowledge,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::RemoteBackend => "RemoteBackend",
            Tier::LocalSimulation => "LocalSimulation",
            Tier::StaticKnowledge => "StaticKnowledge",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mode flags and optional prior results carried alongside a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Retrieval-augmented mode active
    pub retrieval_enabled: bool,
    /// Web-search-agent mode active
    pub search_enabled: bool,
    /// A prior search-mode result, injected when both modes are active so the
    /// router can delegate to the combiner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<EngineResult>,
    /// Cap on sources returned to the caller
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            retrieval_enabled: false,
            search_enabled: false,
            search_results: None,
            max_sources: default_max_sources(),
        }
    }
}

fn default_max_sources() -> usize {
    5
}

/// An immutable user query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub language: Language,
    #[serde(default)]
    pub options: QueryOptions,
}

impl Query {
    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
            options: QueryOptions {
                retrieval_enabled: true,
                ..QueryOptions::default()
            },
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }
}

/// A cited source attached to an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    /// Relevance in [0, 1]
    pub relevance: f32,
}

impl Source {
    pub fn new(title: impl Into<String>, url: impl Into<String>, relevance: f32) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            relevance: relevance.clamp(0.0, 1.0),
        }
    }
}

/// Diagnostic metadata carried by every engine result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Engine that actually produced the answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineId>,
    /// Provider label, e.g. "gemini", "ollama-direct", "local-simulation"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model that generated the answer, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Separation policy applied by the router
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Coordination policy tag ("rag-ollama-only", "sma-gemini-only", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordination_policy: Option<String>,
    /// Fallback tier that produced the result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Combination approach ("combined-sma-rag" or "rag-only-fallback")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approach: Option<String>,
    /// Machine-readable error tag for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the combiner's synthesis call failed and the retrieval-only
    /// result was returned instead
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sma_failed: bool,
    /// Number of documents that backed the answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_used: Option<usize>,
}

/// The uniform result shape produced by every adapter call.
///
/// Never mutated after return; combination produces a new value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

impl EngineResult {
    /// A failure result carrying a user-facing localized message
    pub fn failure(answer: impl Into<String>, metadata: ResultMetadata) -> Self {
        Self {
            success: false,
            answer: Some(answer.into()),
            sources: Vec::new(),
            metadata,
        }
    }
}

/// Result of a single health probe as reported by an adapter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Availability of one engine at one instant. Recomputed on demand, never
/// cached across coordination calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityStatus {
    pub engine: EngineId,
    pub available: bool,
    pub last_checked: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Short localized failure message for exhausted fallback chains.
pub(crate) fn unavailable_message(language: Language) -> &'static str {
    match language {
        Language::Ar => "عذراً، النظام غير متاح حالياً. يرجى المحاولة لاحقاً.",
        _ => "Désolé, le système n'est pas disponible actuellement. Veuillez réessayer plus tard.",
    }
}

/// Localized message for an unknown request kind.
pub(crate) fn unknown_kind_message(language: Language) -> &'static str {
    match language {
        Language::Ar => "نوع طلب غير معروف.",
        _ => "Type de requête inconnu.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::detect("Quelles sont les formations?"), Language::Fr);
        assert_eq!(Language::detect("برامج الذكاء الاصطناعي"), Language::Ar);
        assert_eq!(Language::detect(""), Language::Fr);
        // Mixed text with any Arabic character counts as Arabic
        assert_eq!(Language::detect("ENIAD برامج"), Language::Ar);
    }

    #[test]
    fn test_request_kind_parse() {
        assert_eq!(RequestKind::parse("retrieval"), Some(RequestKind::Retrieval));
        assert_eq!(RequestKind::parse("RAG"), Some(RequestKind::Retrieval));
        assert_eq!(RequestKind::parse("search"), Some(RequestKind::Search));
        assert_eq!(RequestKind::parse("sma"), Some(RequestKind::Search));
        assert_eq!(RequestKind::parse("research"), None);
        assert_eq!(RequestKind::parse(""), None);
    }

    #[test]
    fn test_separation_policy_table() {
        assert_eq!(
            RequestKind::Retrieval.allowed_engines(),
            &[EngineId::LocalModel, EngineId::RetrievalBackend]
        );
        assert_eq!(RequestKind::Search.allowed_engines(), &[EngineId::HostedLlm]);
    }

    #[test]
    fn test_source_relevance_clamped() {
        assert_eq!(Source::new("t", "u", 1.7).relevance, 1.0);
        assert_eq!(Source::new("t", "u", -0.2).relevance, 0.0);
    }
}

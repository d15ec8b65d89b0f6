//! Engine adapters for the four external answer engines
//!
//! Each adapter wraps one HTTP service behind the same [`Engine`] trait:
//! a hosted LLM gateway, a local model server, a RAG backend and a web-search
//! agent. Adapters never fall back on their own; tier selection lives in the
//! fallback resolvers.

mod hosted;
mod local;
mod rag;
mod sma;

pub use hosted::HostedLlmEngine;
pub use local::LocalModelEngine;
pub use rag::RagBackendEngine;
pub use sma::{SearchAgentEngine, SearchFinding};

use crate::error::Result;
use crate::types::{EngineId, EngineStatus, EngineResult, Query};
use async_trait::async_trait;

/// Common surface of every answer engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Stable identifier of the engine
    fn id(&self) -> EngineId;

    /// Answer a query. An `Err` means the engine could not produce a result
    /// and the caller may try another tier; a returned [`EngineResult`] with
    /// `success == false` means the engine answered "no".
    async fn ask(&self, query: &Query) -> Result<EngineResult>;

    /// Probe engine health. Must complete quickly and never hang the caller.
    async fn status(&self) -> EngineStatus;
}

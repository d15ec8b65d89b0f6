//! Engine availability reporting
//!
//! Probes every engine concurrently and reports each one independently: a
//! hung or failing engine never hides the others. Results are computed on
//! demand and never cached across calls.

use crate::config::Config;
use crate::engines::{
    Engine, HostedLlmEngine, LocalModelEngine, RagBackendEngine, SearchAgentEngine,
};
use crate::error::Result;
use crate::types::{AvailabilityStatus, EngineId};
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;

pub struct AvailabilityChecker {
    engines: Vec<Arc<dyn Engine>>,
    /// Engines that could not even be constructed, reported as unavailable
    unconfigured: Vec<(EngineId, String)>,
}

impl AvailabilityChecker {
    pub fn new(engines: Vec<Arc<dyn Engine>>) -> Self {
        Self {
            engines,
            unconfigured: Vec::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut engines: Vec<Arc<dyn Engine>> = Vec::new();
        let mut unconfigured = Vec::new();

        match HostedLlmEngine::new(config.hosted.clone()) {
            Ok(engine) => engines.push(Arc::new(engine)),
            Err(e) => unconfigured.push((EngineId::HostedLlm, e.to_string())),
        }
        engines.push(Arc::new(LocalModelEngine::new(config.local_model.clone())?));
        engines.push(Arc::new(RagBackendEngine::new(config.rag.clone())?));
        engines.push(Arc::new(SearchAgentEngine::new(config.sma.clone())?));

        Ok(Self {
            engines,
            unconfigured,
        })
    }

    /// Probe all engines concurrently.
    pub async fn check_all(&self) -> Vec<AvailabilityStatus> {
        let probes = self.engines.iter().map(|engine| async move {
            let status = engine.status().await;
            AvailabilityStatus {
                engine: engine.id(),
                available: status.available,
                last_checked: Utc::now(),
                model: status.model,
                detail: status.detail,
            }
        });

        let mut statuses = join_all(probes).await;
        for (engine, reason) in &self.unconfigured {
            statuses.push(AvailabilityStatus {
                engine: *engine,
                available: false,
                last_checked: Utc::now(),
                model: None,
                detail: Some(reason.clone()),
            });
        }
        statuses.sort_by_key(|s| s.engine.as_str());
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngineResult, EngineStatus, Query};
    use async_trait::async_trait;

    struct FixedEngine {
        id: EngineId,
        available: bool,
        delay_ms: u64,
    }

    #[async_trait]
    impl Engine for FixedEngine {
        fn id(&self) -> EngineId {
            self.id
        }

        async fn ask(&self, _query: &Query) -> crate::error::Result<EngineResult> {
            Ok(EngineResult::default())
        }

        async fn status(&self) -> EngineStatus {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
            EngineStatus {
                available: self.available,
                model: None,
                detail: (!self.available).then(|| "connection refused".to_string()),
            }
        }
    }

    #[tokio::test]
    async fn test_one_failing_engine_does_not_hide_others() {
        let checker = AvailabilityChecker::new(vec![
            Arc::new(FixedEngine {
                id: EngineId::LocalModel,
                available: true,
                delay_ms: 0,
            }),
            Arc::new(FixedEngine {
                id: EngineId::RetrievalBackend,
                available: false,
                delay_ms: 10,
            }),
        ]);

        let statuses = checker.check_all().await;
        assert_eq!(statuses.len(), 2);
        let local = statuses.iter().find(|s| s.engine == EngineId::LocalModel).unwrap();
        let rag = statuses
            .iter()
            .find(|s| s.engine == EngineId::RetrievalBackend)
            .unwrap();
        assert!(local.available);
        assert!(!rag.available);
        assert!(rag.detail.is_some());
    }

    #[tokio::test]
    async fn test_probes_run_concurrently() {
        let checker = AvailabilityChecker::new(
            EngineId::all()
                .into_iter()
                .map(|id| {
                    Arc::new(FixedEngine {
                        id,
                        available: true,
                        delay_ms: 50,
                    }) as Arc<dyn Engine>
                })
                .collect(),
        );

        let start = std::time::Instant::now();
        let statuses = checker.check_all().await;
        assert_eq!(statuses.len(), 4);
        // Four 50ms probes in parallel finish well under 200ms
        assert!(start.elapsed() < std::time::Duration::from_millis(180));
    }
}

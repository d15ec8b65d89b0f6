//! eniad-core: request coordination and fallback routing for the ENIAD
//! assistant gateway
//!
//! The crate wires four external answer engines behind one router. Retrieval
//! requests are served by the local/retrieval family, search requests by the
//! hosted-LLM family, and each family degrades through a strict tier order:
//! remote backend, local simulation, static knowledge. Resolution never
//! surfaces an error to the caller; an exhausted chain yields a localized
//! failure result.

pub mod availability;
pub mod config;
pub mod engines;
pub mod error;
pub mod events;
pub mod fallback;
pub mod knowledge;
pub mod router;
pub mod types;

pub use availability::AvailabilityChecker;
pub use config::Config;
pub use error::{EniadError, Result};
pub use events::{CoordinationEvent, EventSink, MemorySink, TracingSink};
pub use router::Router;
pub use types::{
    AvailabilityStatus, EngineId, EngineResult, Language, Query, QueryOptions, RequestKind,
    ResultMetadata, Source, Tier,
};

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "eniad-gateway";

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

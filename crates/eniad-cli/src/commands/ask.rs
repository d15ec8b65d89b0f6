//! Ask command
//!
//! Runs the search pass first when requested, then feeds its result into the
//! retrieval pass so the router can produce a combined answer. Returns whether
//! the gateway produced a successful answer.

use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::Result;
use eniad_core::events::TracingSink;
use eniad_core::types::{Language, Query, QueryOptions};
use eniad_core::{Config, Router};
use std::sync::Arc;

pub async fn run(args: AskArgs, config: &Config, format: OutputFormat) -> Result<bool> {
    let language = match &args.language {
        Some(lang) => lang.parse::<Language>()?,
        None => Language::detect(&args.query),
    };

    let router = Router::from_config(config, Arc::new(TracingSink))?;

    let search_result = if args.search {
        let query = Query::new(&args.query, language).with_options(QueryOptions {
            retrieval_enabled: false,
            search_enabled: true,
            search_results: None,
            max_sources: args.max_sources,
        });
        Some(router.route_request("search", &query).await)
    } else {
        None
    };

    let result = if args.no_rag {
        match search_result {
            Some(result) => result,
            None => anyhow::bail!("nothing to do: --no-rag without --search"),
        }
    } else {
        let query = Query::new(&args.query, language).with_options(QueryOptions {
            retrieval_enabled: true,
            search_enabled: args.search,
            search_results: search_result,
            max_sources: args.max_sources,
        });
        router.route_request("retrieval", &query).await
    };

    output::print_result(&result, format)?;
    Ok(result.success)
}

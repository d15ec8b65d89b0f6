//! Status command

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use eniad_core::{AvailabilityChecker, Config};

pub async fn run(config: &Config, format: OutputFormat) -> Result<()> {
    let checker = AvailabilityChecker::from_config(config)?;
    let statuses = checker.check_all().await;
    output::print_statuses(&statuses, format)?;
    Ok(())
}

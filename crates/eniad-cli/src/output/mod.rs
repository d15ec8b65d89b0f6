//! Terminal and JSON rendering

use crate::app::OutputFormat;
use anyhow::Result;
use eniad_core::types::{AvailabilityStatus, EngineResult};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn print_result(result: &EngineResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        OutputFormat::Cli => print_result_terminal(result),
    }
}

fn print_result_terminal(result: &EngineResult) -> Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    if let Some(answer) = &result.answer {
        if !result.success {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
        }
        writeln!(stdout, "{answer}")?;
        stdout.reset()?;
    }

    if !result.sources.is_empty() {
        writeln!(stdout)?;
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stdout, "Sources:")?;
        stdout.reset()?;
        for source in &result.sources {
            writeln!(
                stdout,
                "  - {} ({}) [{:.0}%]",
                source.title,
                source.url,
                source.relevance * 100.0
            )?;
        }
    }

    let meta = &result.metadata;
    let mut tags = Vec::new();
    if let Some(engine) = meta.engine {
        tags.push(format!("engine={engine}"));
    }
    if let Some(provider) = &meta.provider {
        tags.push(format!("provider={provider}"));
    }
    if let Some(tier) = meta.tier {
        tags.push(format!("tier={tier}"));
    }
    if let Some(approach) = &meta.approach {
        tags.push(format!("approach={approach}"));
    }
    if !tags.is_empty() {
        writeln!(stdout)?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(stdout, "[{}]", tags.join(" "))?;
        stdout.reset()?;
    }
    Ok(())
}

pub fn print_statuses(statuses: &[AvailabilityStatus], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(statuses)?);
            Ok(())
        }
        OutputFormat::Cli => {
            let mut stdout = StandardStream::stdout(ColorChoice::Auto);
            for status in statuses {
                let (mark, color) = if status.available {
                    ("✓", Color::Green)
                } else {
                    ("✗", Color::Red)
                };
                stdout.set_color(ColorSpec::new().set_fg(Some(color)))?;
                write!(stdout, "{mark} ")?;
                stdout.reset()?;
                write!(stdout, "{:<20}", status.engine.as_str())?;
                if let Some(model) = &status.model {
                    write!(stdout, " model={model}")?;
                }
                if let Some(detail) = &status.detail {
                    write!(stdout, " ({detail})")?;
                }
                writeln!(stdout)?;
            }
            Ok(())
        }
    }
}

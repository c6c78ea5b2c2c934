//! Result output formatting and writing.

use crate::pipeline::PipelineResults;
use crate::OutputFormat;
use anyhow::{Context, Result};
use lib_signal::Signal;
use std::path::Path;

/// Write a signal as JSON.
pub fn write_signal(signal: &Signal, path: &Path, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let encoded = if pretty {
        serde_json::to_string_pretty(signal)?
    } else {
        serde_json::to_string(signal)?
    };
    std::fs::write(path, encoded).with_context(|| format!("Failed to write {:?}", path))?;

    tracing::info!("Wrote {} samples to {:?}", signal.len(), path);
    Ok(())
}

/// Summary of a signal as a JSON value.
pub fn signal_summary(signal: &Signal) -> serde_json::Value {
    let mean = signal.nanmean();
    let mut summary = serde_json::json!({
        "kind": signal.kind(),
        "name": signal.name(),
        "samples": signal.len(),
        "channels": signal.channel_count(),
        "unit": signal.unit().to_string(),
        "domain": signal.domain_name(),
        "domain_unit": signal.domain_unit().to_string(),
        "duration": signal.duration().value,
        "mean": mean.values.to_vec(),
    });

    if let Signal::Regular(s) = signal {
        summary["origin"] = serde_json::json!(s.origin().value);
        summary["sampling_period"] = serde_json::json!(s.sampling_period().value);
    }
    summary
}

/// Print a signal summary to stdout.
pub fn print_signal(signal: &Signal, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", signal);
            match signal {
                Signal::Regular(s) => {
                    println!("  Origin:   {}", s.origin());
                    println!("  Period:   {}", s.sampling_period());
                    println!("  Rate:     {}", s.sampling_rate());
                }
                Signal::Irregular(s) => {
                    if let (Some(start), Some(end)) = (s.start(), s.end()) {
                        println!("  Domain:   {} .. {}", start, end);
                    }
                }
            }
            println!("  Duration: {}", signal.duration());

            let mean = signal.nanmean();
            for (channel, value) in mean.values.iter().enumerate() {
                println!("  Mean[{}]:  {} {}", channel, value, mean.unit);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&signal_summary(signal))?);
        }
    }
    Ok(())
}

/// Print pipeline results to stdout.
pub fn print_results(name: &str, results: &PipelineResults, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("\n=== Pipeline: {} ===\n", name);
            for (position, step) in results.steps.iter().enumerate() {
                println!(
                    "  {:>2}. {:<16} {} x {} in {}",
                    position, step.op, step.samples, step.channels, step.unit
                );
            }
            println!();
            print_signal(&results.signal, format)?;
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "pipeline": name,
                "steps": results.steps,
                "result": signal_summary(&results.signal),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

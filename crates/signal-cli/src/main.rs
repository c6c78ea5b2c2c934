//! sigkit: run unit-aware pipelines over serialized sampled signals.

mod config;
mod output;
mod pipeline;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lib_units::{families, family_name, Quantity, Unit};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sigkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a signal pipeline
    Run {
        /// Path to the pipeline configuration file (TOML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Write the resulting signal here instead of the configured path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a serialized signal
    Inspect {
        /// Path to a JSON-encoded signal
        file: PathBuf,
    },

    /// Convert a value between units
    Convert {
        value: f64,

        /// Source unit, e.g. "mV"
        from: String,

        /// Target unit, e.g. "V"
        to: String,
    },

    /// Describe a unit expression
    Units {
        /// Unit expression, e.g. "pA/ms"
        expr: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Run { config, output } => {
            run_pipeline(&config, output.as_deref(), cli.format)?;
        }
        Commands::Inspect { file } => {
            inspect(&file, cli.format)?;
        }
        Commands::Convert { value, from, to } => {
            convert(value, &from, &to, cli.format)?;
        }
        Commands::Units { expr } => {
            describe_unit(&expr, cli.format)?;
        }
    }

    Ok(())
}

fn run_pipeline(config_path: &Path, output_override: Option<&Path>, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let name = config.name.clone();
    let destination = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.output.path.clone());
    let pretty = config.output.pretty;

    let results = pipeline::Pipeline::new(config)?.run()?;

    if let Some(path) = destination {
        output::write_signal(&results.signal, &path, pretty)?;
    }
    output::print_results(&name, &results, format)?;

    Ok(())
}

fn inspect(file: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Inspecting signal file: {:?}", file);

    let signal = pipeline::load_signal(file)?;
    output::print_signal(&signal, format)
}

fn convert(value: f64, from: &str, to: &str, format: OutputFormat) -> Result<()> {
    let quantity = Quantity::parse(value, from).with_context(|| format!("Invalid unit: {}", from))?;
    let target = Unit::parse(to).with_context(|| format!("Invalid unit: {}", to))?;
    let converted = quantity.rescale(&target)?;

    match format {
        OutputFormat::Text => println!("{} = {}", quantity, converted),
        OutputFormat::Json => {
            let json = serde_json::json!({ "from": quantity, "to": converted });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn describe_unit(expr: &str, format: OutputFormat) -> Result<()> {
    let unit = Unit::parse(expr).with_context(|| format!("Invalid unit: {}", expr))?;
    let found: Vec<String> = families(&unit).iter().map(|f| f.to_string()).collect();

    match format {
        OutputFormat::Text => {
            println!("Unit:      {}", unit);
            println!("Dimension: {}", unit.dimension());
            println!("Scale:     {}", unit.scale());
            println!("Family:    {}", family_name(&unit));
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "symbol": unit.symbol(),
                "dimension": unit.dimension().to_string(),
                "scale": unit.scale(),
                "families": found,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

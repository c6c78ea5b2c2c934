//! Pipeline configuration loading and validation.

use anyhow::{Context, Result};
use lib_signal::{BinaryOp, Padding, Quantity, Unit, WindowType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name, used in log lines and the summary.
    pub name: String,

    /// Serialized signals. The first one is the pipeline's starting signal;
    /// the others are referenced by index from steps.
    pub inputs: Vec<InputConfig>,

    /// Operations applied in order to the current signal.
    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(default)]
    pub output: OutputConfig,
}

/// One serialized signal file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to a JSON-encoded signal.
    pub path: PathBuf,

    /// Owner index attached after loading.
    #[serde(default)]
    pub owner: Option<usize>,
}

/// A single pipeline operation.
///
/// ```toml
/// [[steps]]
/// op = "interval"
/// start = { value = 0.3, unit = "s" }
///
/// [[steps]]
/// op = "concatenate"
/// with = [1, 2]
/// padding = "auto"
///
/// [[steps]]
/// op = "decimate"
/// factor = 4
/// window = "blackman"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Slice {
        start: usize,
        stop: usize,
    },
    Interval {
        #[serde(default)]
        start: Option<Quantity>,
        #[serde(default)]
        stop: Option<Quantity>,
    },
    SelectChannels {
        channels: Vec<usize>,
    },
    Shift {
        by: Quantity,
    },
    Rescale {
        unit: Unit,
    },
    RescaleDomain {
        unit: Unit,
    },
    Arithmetic {
        operator: BinaryOp,
        operand: OperandConfig,
    },
    Decimate {
        factor: usize,
        /// Anti-alias filter window, Hamming when omitted.
        #[serde(default)]
        window: WindowType,
    },
    Resample {
        samples: usize,
    },
    ToRegular {
        samples: usize,
    },
    Concatenate {
        with: Vec<usize>,
        #[serde(default)]
        overwrite: bool,
        #[serde(default)]
        padding: Padding,
    },
    Merge {
        with: Vec<usize>,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Slice { .. } => "slice",
            Self::Interval { .. } => "interval",
            Self::SelectChannels { .. } => "select_channels",
            Self::Shift { .. } => "shift",
            Self::Rescale { .. } => "rescale",
            Self::RescaleDomain { .. } => "rescale_domain",
            Self::Arithmetic { .. } => "arithmetic",
            Self::Decimate { .. } => "decimate",
            Self::Resample { .. } => "resample",
            Self::ToRegular { .. } => "to_regular",
            Self::Concatenate { .. } => "concatenate",
            Self::Merge { .. } => "merge",
        }
    }

    /// Input indices this step reads besides the current signal.
    fn referenced_inputs(&self) -> Vec<usize> {
        match self {
            Self::Concatenate { with, .. } | Self::Merge { with } => with.clone(),
            Self::Arithmetic {
                operand: OperandConfig::Input { input },
                ..
            } => vec![*input],
            _ => Vec::new(),
        }
    }
}

/// Right-hand side of an arithmetic step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperandConfig {
    Scalar(f64),
    Quantity(Quantity),
    Input { input: usize },
}

/// Where and how the final signal is written.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination for the JSON-encoded result. Nothing is written when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: default_true(),
        }
    }
}

fn default_true() -> bool { true }

/// Load configuration from a file.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: PipelineConfig = if path.extension().map_or(false, |e| e == "json") {
        serde_json::from_str(&content).with_context(|| "Failed to parse config as JSON")?
    } else {
        toml::from_str(&content).with_context(|| "Failed to parse config as TOML")?
    };

    validate_config(&config)?;

    Ok(config)
}

/// Validate configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.inputs.is_empty() {
        anyhow::bail!("Pipeline '{}' has no inputs", config.name);
    }

    for input in &config.inputs {
        if !input.path.exists() {
            anyhow::bail!("Input signal not found: {:?}", input.path);
        }
    }

    for (position, step) in config.steps.iter().enumerate() {
        for index in step.referenced_inputs() {
            if index >= config.inputs.len() {
                anyhow::bail!(
                    "Step {} ({}) references input {}, but only {} inputs are configured",
                    position,
                    step.name(),
                    index,
                    config.inputs.len()
                );
            }
        }

        match step {
            Step::Slice { start, stop } if start > stop => {
                anyhow::bail!("Step {}: slice start {} is after stop {}", position, start, stop);
            }
            Step::Decimate { factor: 0, .. } => {
                anyhow::bail!("Step {}: decimation factor must be at least 1", position);
            }
            Step::Resample { samples: 0 } => {
                anyhow::bail!("Step {}: resample needs at least 1 sample", position);
            }
            Step::ToRegular { samples } if *samples < 2 => {
                anyhow::bail!("Step {}: to_regular needs at least 2 samples", position);
            }
            Step::SelectChannels { channels } if channels.is_empty() => {
                anyhow::bail!("Step {}: select_channels needs at least one channel", position);
            }
            _ => {}
        }
    }

    Ok(())
}

//! Pipeline execution.

use crate::config::{OperandConfig, PipelineConfig, Step};
use anyhow::{Context, Result};
use lib_signal::{concatenate, merge, ConcatOptions, OwnerHandle, RegularSignal, Signal, SignalOperand};
use serde::Serialize;
use std::path::Path;

/// Pipeline runner.
pub struct Pipeline {
    config: PipelineConfig,
    inputs: Vec<Signal>,
}

/// Outcome of one executed step.
#[derive(Clone, Debug, Serialize)]
pub struct StepRecord {
    pub op: &'static str,
    pub samples: usize,
    pub channels: usize,
    pub unit: String,
}

/// Final signal plus a trace of the steps that produced it.
#[derive(Clone, Debug)]
pub struct PipelineResults {
    pub signal: Signal,
    pub steps: Vec<StepRecord>,
}

/// Read one JSON-encoded signal.
pub fn load_signal(path: &Path) -> Result<Signal> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to decode signal: {:?}", path))
}

impl Pipeline {
    /// Load every configured input.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let inputs = config
            .inputs
            .iter()
            .map(|input| {
                tracing::info!("Loading input {:?}", input.path);
                let mut signal = load_signal(&input.path)?;
                signal.set_owner(input.owner.map(OwnerHandle));
                Ok(signal)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_signals(config, inputs))
    }

    /// Build a runner over already-decoded inputs.
    pub fn from_signals(config: PipelineConfig, inputs: Vec<Signal>) -> Self {
        Self { config, inputs }
    }

    /// Run all steps starting from the first input.
    pub fn run(&self) -> Result<PipelineResults> {
        tracing::info!("Running pipeline: {}", self.config.name);

        let mut current = self
            .inputs
            .first()
            .cloned()
            .context("Pipeline has no inputs")?;
        let mut steps = Vec::with_capacity(self.config.steps.len());

        for (position, step) in self.config.steps.iter().enumerate() {
            current = self
                .apply_step(&current, step)
                .with_context(|| format!("Step {} ({}) failed", position, step.name()))?;

            tracing::debug!("After {}: {}", step.name(), current);
            steps.push(StepRecord {
                op: step.name(),
                samples: current.len(),
                channels: current.channel_count(),
                unit: current.unit().to_string(),
            });
        }

        tracing::info!("Pipeline complete");
        Ok(PipelineResults {
            signal: current,
            steps,
        })
    }

    fn input(&self, index: usize) -> Result<&Signal> {
        self.inputs
            .get(index)
            .with_context(|| format!("No input with index {}", index))
    }

    fn apply_step(&self, current: &Signal, step: &Step) -> Result<Signal> {
        let next = match step {
            Step::Slice { start, stop } => current.slice(*start..*stop)?,
            Step::Interval { start, stop } => current.interval(start.as_ref(), stop.as_ref())?,
            Step::SelectChannels { channels } => current.select_channels(channels)?,
            Step::Shift { by } => current.shift(by)?,
            Step::Rescale { unit } => current.rescale(unit)?,
            Step::RescaleDomain { unit } => current.rescale_domain(unit)?,
            Step::Arithmetic { operator, operand } => {
                let rhs = match operand {
                    OperandConfig::Scalar(v) => SignalOperand::Scalar(*v),
                    OperandConfig::Quantity(q) => SignalOperand::Quantity(q),
                    OperandConfig::Input { input } => SignalOperand::Signal(self.input(*input)?),
                };
                current.apply(*operator, rhs)?
            }
            Step::Decimate { factor, window } => {
                Signal::Regular(regular(current, step)?.decimate_with(*factor, *window)?)
            }
            Step::Resample { samples } => Signal::Regular(regular(current, step)?.resample(*samples)?),
            Step::ToRegular { samples } => match current {
                Signal::Irregular(s) => Signal::Regular(s.to_regular(*samples)?),
                Signal::Regular(_) => {
                    tracing::warn!("to_regular on a regular signal; leaving it unchanged");
                    current.clone()
                }
            },
            Step::Concatenate {
                with,
                overwrite,
                padding,
            } => {
                let mut parts = vec![regular(current, step)?];
                for index in with {
                    parts.push(regular(self.input(*index)?, step)?);
                }
                let options = ConcatOptions::default()
                    .overwrite(*overwrite)
                    .padding(padding.clone());
                Signal::Regular(concatenate(&parts, &options)?)
            }
            Step::Merge { with } => {
                let mut parts = vec![current];
                for index in with {
                    parts.push(self.input(*index)?);
                }
                merge(&parts)?
            }
        };
        Ok(next)
    }
}

fn regular<'a>(signal: &'a Signal, step: &Step) -> Result<&'a RegularSignal> {
    signal.as_regular().with_context(|| {
        format!(
            "{} needs a regular signal, got an {} one",
            step.name(),
            signal.kind()
        )
    })
}

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::ProbeError;

/// Per-core utilization percentages captured over one sampling interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample(Vec<f64>);

impl Sample {
    pub fn new(readings: Vec<f64>) -> Self {
        Self(readings)
    }

    pub fn cores(&self) -> usize {
        self.0.len()
    }

    pub fn readings(&self) -> &[f64] {
        &self.0
    }
}

/// Samples for one run, in capture order.
///
/// The first sample fixes the core count; every later sample must match it.
#[derive(Debug, Clone, Default)]
pub struct SampleSeries {
    cores: Option<usize>,
    samples: Vec<Sample>,
}

impl SampleSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a series whose core count is known before the first sample.
    pub fn with_cores(cores: usize) -> Self {
        Self {
            cores: Some(cores),
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) -> Result<(), ProbeError> {
        if sample.cores() == 0 {
            return Err(ProbeError::SampleCapture {
                detail: "sample contains no per-core readings".to_string(),
            });
        }
        match self.cores {
            Some(expected) if expected != sample.cores() => {
                return Err(ProbeError::CoreCountMismatch {
                    expected,
                    actual: sample.cores(),
                });
            }
            Some(_) => {}
            None => self.cores = Some(sample.cores()),
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cores(&self) -> Option<usize> {
        self.cores
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl TryFrom<Vec<Vec<f64>>> for SampleSeries {
    type Error = ProbeError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let mut series = SampleSeries::new();
        for row in rows {
            series.push(Sample::new(row))?;
        }
        Ok(series)
    }
}

/// Program plus arguments, handed to the OS without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits on ASCII whitespace. No quoting or shell expansion is applied.
    pub fn parse(line: &str) -> Result<Self, ProbeError> {
        let mut parts = line.split_ascii_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| ProbeError::Launch {
            command: line.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn from_argv(argv: &[String]) -> Result<Self, ProbeError> {
        match argv.split_first() {
            Some((program, args)) if !program.is_empty() => {
                Ok(Self::new(program.clone(), args.to_vec()))
            }
            _ => Self::parse(""),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status of the workload, detached from the OS handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
    pub success: bool,
}

impl ExitOutcome {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Exited,
    Reported,
}

/// Result of one completed run.
#[derive(Debug, Clone)]
pub struct UsageReport {
    pub average_cpu: f64,
    pub elapsed: Duration,
    pub samples: usize,
    pub cores: usize,
    pub started_at: DateTime<Utc>,
    pub exit: ExitOutcome,
    pub command: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Default,
    Short,
}

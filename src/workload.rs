use std::path::Path;

use serde::Deserialize;

use crate::errors::ProbeError;
use crate::types::CommandLine;

/// File name of the semaphore benchmark, expected next to this executable.
pub const DEFAULT_BINARY_NAME: &str = "sem_test";

/// Parameters of the producer/consumer semaphore benchmark.
///
/// Values are passed through verbatim; the benchmark validates them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadParams {
    pub silent: bool,
    pub buffer_size: u32,
    /// Items each consumer takes before it stops.
    pub consumer_limit: u32,
    pub consumers: u32,
    pub producers: u32,
    /// Seconds a consumer sleeps after each item.
    pub consumer_delay: f64,
    /// Seconds a producer sleeps after each item.
    pub producer_delay: f64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            silent: true,
            buffer_size: 50,
            consumer_limit: 100,
            consumers: 125,
            producers: 66,
            consumer_delay: 0.001,
            producer_delay: 0.002,
        }
    }
}

impl WorkloadParams {
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(13);
        if self.silent {
            args.push("-s".to_string());
        }
        let flags = [
            ("-bs", self.buffer_size.to_string()),
            ("-cl", self.consumer_limit.to_string()),
            ("-c", self.consumers.to_string()),
            ("-p", self.producers.to_string()),
            ("-cs", self.consumer_delay.to_string()),
            ("-ps", self.producer_delay.to_string()),
        ];
        for (flag, value) in flags {
            args.push(flag.to_string());
            args.push(value);
        }
        args
    }

    /// Fails for a binary path that is not valid UTF-8.
    pub fn command_line(&self, binary: &Path) -> Result<CommandLine, ProbeError> {
        let program = binary.to_str().ok_or_else(|| ProbeError::InvalidConfig {
            detail: format!("benchmark path {} is not valid UTF-8", binary.display()),
        })?;
        Ok(CommandLine::new(program, self.args()))
    }
}

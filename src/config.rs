use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::ProbeError;
use crate::monitor::MonitorConfig;
use crate::types::OutputFormat;
use crate::workload::{DEFAULT_BINARY_NAME, WorkloadParams};

/// Settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Benchmark executable. Defaults to `sem_test` next to this binary.
    pub binary: Option<PathBuf>,
    pub format: OutputFormat,
    pub workload: WorkloadParams,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    pub timeout_secs: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            timeout_secs: None,
        }
    }
}

impl SamplingConfig {
    pub fn monitor_config(&self) -> Result<MonitorConfig, ProbeError> {
        if self.interval_ms == 0 {
            return Err(ProbeError::InvalidConfig {
                detail: "sampling interval must be greater than 0 ms".to_string(),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(ProbeError::InvalidConfig {
                detail: "timeout must be greater than 0 s".to_string(),
            });
        }
        Ok(MonitorConfig {
            interval: Duration::from_millis(self.interval_ms),
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// `$XDG_CONFIG_HOME/semprobe/config.toml` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("semprobe").join("config.toml"))
}

pub fn parse(text: &str, path: &Path) -> Result<Config, ProbeError> {
    toml::from_str(text).map_err(|e| ProbeError::ConfigParse {
        path: path.to_path_buf(),
        detail: e.message().to_string(),
    })
}

pub fn load(path: &Path) -> Result<Config, ProbeError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProbeError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, path)
}

/// Loads `explicit` if given, otherwise the default file if it exists.
///
/// A missing explicit file is an error; a missing default file is not.
pub fn resolve(explicit: Option<&Path>) -> Result<Config, ProbeError> {
    if let Some(path) = explicit {
        return load(path);
    }
    match default_path() {
        Some(path) if path.is_file() => {
            log::debug!("using config file {}", path.display());
            load(&path)
        }
        _ => Ok(Config::default()),
    }
}

/// The benchmark executable sitting in the same directory as `exe`.
pub fn colocated_binary(exe: &Path) -> PathBuf {
    exe.parent()
        .unwrap_or_else(|| Path::new("."))
        .join(DEFAULT_BINARY_NAME)
}

use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("Failed to launch '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },

    #[error("CPU sample capture failed: {detail}")]
    SampleCapture { detail: String },

    #[error("CPU sample has {actual} cores, expected {expected}")]
    CoreCountMismatch { expected: usize, actual: usize },

    #[error("No CPU samples were captured before the workload exited")]
    EmptySeries,

    #[error("Failed to query workload process {pid}: {source}")]
    Wait { pid: u32, source: std::io::Error },

    #[error("Workload exceeded the {}s timeout and was terminated", .limit.as_secs_f64())]
    Timeout { limit: Duration },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    #[error("Invalid configuration: {detail}")]
    InvalidConfig { detail: String },
}

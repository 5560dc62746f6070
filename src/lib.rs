pub mod aggregate;
pub mod config;
pub mod display;
pub mod errors;
pub mod monitor;
pub mod sampler;
pub mod supervisor;
pub mod types;
pub mod workload;

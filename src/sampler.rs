//! Per-core CPU utilization capture.
//!
//! A capture blocks for the whole sampling interval and returns the
//! utilization measured over exactly that interval, so the cadence of the
//! monitor loop and the measurement window are the same thing.

use std::thread;
use std::time::Duration;

use sysinfo::System;

use crate::errors::ProbeError;
use crate::types::Sample;

pub trait CpuSampler {
    /// Number of cores detected when the sampler was created.
    fn cores(&self) -> usize;

    /// Waits `interval` and returns one reading per core for that window.
    fn capture(&mut self, interval: Duration) -> Result<Sample, ProbeError>;
}

/// System-wide per-core sampler backed by `sysinfo`.
///
/// Readings are not attributed to any process: they cover everything running
/// on each core during the window.
pub struct SysinfoSampler {
    system: System,
    cores: usize,
}

impl SysinfoSampler {
    /// Takes the baseline reading the first capture is measured against.
    pub fn new() -> Result<Self, ProbeError> {
        let mut system = System::new();
        system.refresh_cpu_usage();
        let cores = system.cpus().len();
        if cores == 0 {
            return Err(ProbeError::SampleCapture {
                detail: "no CPU cores reported by the operating system".to_string(),
            });
        }
        log::debug!("cpu sampler initialised with {} cores", cores);
        Ok(Self { system, cores })
    }
}

impl CpuSampler for SysinfoSampler {
    fn cores(&self) -> usize {
        self.cores
    }

    fn capture(&mut self, interval: Duration) -> Result<Sample, ProbeError> {
        // Shorter windows than this make sysinfo return stale usage.
        let window = interval.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        thread::sleep(window);
        self.system.refresh_cpu_usage();

        let readings: Vec<f64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| f64::from(cpu.cpu_usage()))
            .collect();

        if readings.is_empty() {
            return Err(ProbeError::SampleCapture {
                detail: "operating system returned no per-core readings".to_string(),
            });
        }
        if readings.iter().any(|r| !r.is_finite()) {
            return Err(ProbeError::SampleCapture {
                detail: format!("non-finite utilization reading in {:?}", readings),
            });
        }
        Ok(Sample::new(readings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sysinfo_sampler_reports_every_core() {
        let mut sampler = SysinfoSampler::new().unwrap();
        let cores = sampler.cores();
        assert!(cores >= 1);

        let sample = sampler.capture(Duration::from_millis(250)).unwrap();
        assert_eq!(sample.cores(), cores);
        for reading in sample.readings() {
            assert!(reading.is_finite() && *reading >= 0.0, "bad utilization {}", reading);
        }
    }

    #[test]
    fn capture_blocks_for_the_interval() {
        let mut sampler = SysinfoSampler::new().unwrap();
        let interval = Duration::from_millis(300);
        let start = Instant::now();
        sampler.capture(interval).unwrap();
        assert!(start.elapsed() >= interval);
    }

    #[test]
    fn capture_never_shorter_than_sysinfo_minimum() {
        let mut sampler = SysinfoSampler::new().unwrap();
        let start = Instant::now();
        sampler.capture(Duration::from_millis(1)).unwrap();
        assert!(start.elapsed() >= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    }
}

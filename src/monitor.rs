use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::aggregate;
use crate::errors::ProbeError;
use crate::sampler::CpuSampler;
use crate::supervisor::{self, MonitoredProcess, Supervised};
use crate::types::{CommandLine, RunState, SampleSeries, UsageReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Sampling cadence, which is also each sample's measurement window.
    pub interval: Duration,
    /// Kill the workload and fail the run once this much time has elapsed.
    pub timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: None,
        }
    }
}

impl RunState {
    /// The only state reachable from `self`, if any.
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::NotStarted => Some(RunState::Running),
            RunState::Running => Some(RunState::Exited),
            RunState::Exited => Some(RunState::Reported),
            RunState::Reported => None,
        }
    }
}

/// One measured run of one workload process.
///
/// `run` consumes the monitor, so a monitor can only ever produce one report.
pub struct Monitor<P, S> {
    process: P,
    sampler: S,
    config: MonitorConfig,
    command: String,
    started_at: DateTime<Utc>,
    state: RunState,
}

impl<S: CpuSampler> Monitor<MonitoredProcess, S> {
    /// Launches `command` and returns a monitor in the `Running` state.
    ///
    /// On launch failure the sampler is dropped without ever being used.
    pub fn launch(
        command: &CommandLine,
        sampler: S,
        config: MonitorConfig,
    ) -> Result<Self, ProbeError> {
        let process = supervisor::launch(command)?;
        let started_at = process.started_at();
        Ok(Self::attach(process, sampler, config, command.to_string(), started_at))
    }
}

impl<P: Supervised, S: CpuSampler> Monitor<P, S> {
    /// Wraps an already running process.
    pub fn attach(
        process: P,
        sampler: S,
        config: MonitorConfig,
        command: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut monitor = Self {
            process,
            sampler,
            config,
            command,
            started_at,
            state: RunState::NotStarted,
        };
        monitor.advance(RunState::Running);
        monitor
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Samples until the workload exits, then reduces the samples to a report.
    ///
    /// Liveness is only checked between whole intervals, so the interval in
    /// which the workload exits is still captured and counted.
    pub fn run(mut self) -> Result<UsageReport, ProbeError> {
        let interval = self.config.interval;
        let mut series = SampleSeries::with_cores(self.sampler.cores());

        let start = Instant::now();
        loop {
            match self.process.is_alive() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return Err(self.abort(err)),
            }

            if let Some(limit) = self.config.timeout {
                if start.elapsed() >= limit {
                    log::warn!(
                        "workload pid {} still running after {:.2}s, terminating",
                        self.process.pid(),
                        limit.as_secs_f64()
                    );
                    return Err(self.abort(ProbeError::Timeout { limit }));
                }
            }

            let captured = self
                .sampler
                .capture(interval)
                .and_then(|sample| {
                    log::debug!("sample {}: {:?}", series.len(), sample.readings());
                    series.push(sample)
                });
            if let Err(err) = captured {
                return Err(self.abort(err));
            }
        }
        let elapsed = start.elapsed();
        self.advance(RunState::Exited);

        let exit = self.process.wait_for_exit()?;
        log::info!(
            "workload pid {} finished with {} after {} samples",
            self.process.pid(),
            exit,
            series.len()
        );

        let average_cpu = aggregate::average_usage(&series)?;
        self.advance(RunState::Reported);

        Ok(UsageReport {
            average_cpu,
            elapsed,
            samples: series.len(),
            cores: self.sampler.cores(),
            started_at: self.started_at,
            exit,
            command: self.command,
        })
    }

    /// Kills and reaps the workload so a failed run leaves no orphan behind.
    fn abort(&mut self, err: ProbeError) -> ProbeError {
        if let Err(kill_err) = self.process.terminate() {
            log::warn!("could not terminate workload: {}", kill_err);
        } else if let Err(wait_err) = self.process.wait_for_exit() {
            log::warn!("could not reap workload: {}", wait_err);
        }
        err
    }

    fn advance(&mut self, to: RunState) {
        debug_assert_eq!(self.state.next(), Some(to), "illegal run transition");
        log::debug!("run state {:?} -> {:?}", self.state, to);
        self.state = to;
    }
}

use std::process::{Child, Command, Stdio};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::errors::ProbeError;
use crate::types::{CommandLine, ExitOutcome};

/// Liveness and exit handling for the process being measured.
///
/// The sampling loop only depends on this trait, so tests can drive it with a
/// scripted child instead of a real OS process.
pub trait Supervised {
    fn pid(&self) -> u32;

    /// Non-blocking. Once this returns `false` it never returns `true` again.
    fn is_alive(&mut self) -> Result<bool, ProbeError>;

    /// Blocks until the process has exited.
    fn wait_for_exit(&mut self) -> Result<ExitOutcome, ProbeError>;

    /// Kills the process. A no-op if it has already exited.
    fn terminate(&mut self) -> Result<(), ProbeError>;
}

/// A launched workload process.
#[derive(Debug)]
pub struct MonitoredProcess {
    child: Child,
    started_at: DateTime<Utc>,
    started: Instant,
    exited: Option<Instant>,
}

/// Starts `command` as a child process without a shell.
///
/// Returns as soon as the OS has created the process.
pub fn launch(command: &CommandLine) -> Result<MonitoredProcess, ProbeError> {
    let child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|source| ProbeError::Launch {
            command: command.to_string(),
            source,
        })?;

    log::info!("launched workload pid {}: {}", child.id(), command);

    Ok(MonitoredProcess {
        child,
        started_at: Utc::now(),
        started: Instant::now(),
        exited: None,
    })
}

impl MonitoredProcess {
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Instant of the first observation that the process had exited.
    pub fn exited(&self) -> Option<Instant> {
        self.exited
    }
}

impl Supervised for MonitoredProcess {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn is_alive(&mut self) -> Result<bool, ProbeError> {
        if self.exited.is_some() {
            return Ok(false);
        }
        // `Child` caches the status once reaped, so a later `wait` still sees it.
        match self.child.try_wait() {
            Ok(Some(_)) => {
                self.exited = Some(Instant::now());
                Ok(false)
            }
            Ok(None) => Ok(true),
            Err(source) => Err(ProbeError::Wait {
                pid: self.child.id(),
                source,
            }),
        }
    }

    fn wait_for_exit(&mut self) -> Result<ExitOutcome, ProbeError> {
        let status = self.child.wait().map_err(|source| ProbeError::Wait {
            pid: self.child.id(),
            source,
        })?;
        if self.exited.is_none() {
            self.exited = Some(Instant::now());
        }
        Ok(ExitOutcome::from(status))
    }

    fn terminate(&mut self) -> Result<(), ProbeError> {
        if self.exited.is_some() {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => Ok(()),
            // Already exited between the last liveness check and now.
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(source) => Err(ProbeError::Wait {
                pid: self.child.id(),
                source,
            }),
        }
    }
}

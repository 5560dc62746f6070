use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use semprobe::config;
use semprobe::display;
use semprobe::monitor::Monitor;
use semprobe::sampler::SysinfoSampler;
use semprobe::types::{CommandLine, OutputFormat};

#[derive(Parser)]
#[command(
    name = "semprobe",
    version,
    about = "Run the semaphore benchmark and report approximate CPU usage and run time"
)]
struct Cli {
    /// Config file (default: <config dir>/semprobe/config.toml, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Benchmark executable (default: sem_test next to semprobe)
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Kill the workload and fail after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[arg(long)]
    format: Option<OutputFormat>,

    #[arg(long)]
    json: bool,

    /// Measure this command instead of the benchmark
    #[arg(last = true)]
    command: Vec<String>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::resolve(cli.config.as_deref())?;
    if let Some(binary) = cli.binary {
        config.binary = Some(binary);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.sampling.interval_ms = interval_ms;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.sampling.timeout_secs = Some(timeout_secs);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    let monitor_config = config.sampling.monitor_config()?;

    let command = if cli.command.is_empty() {
        let binary = match config.binary {
            Some(binary) => binary,
            None => {
                let exe = std::env::current_exe()
                    .context("Could not locate the semprobe executable")?;
                config::colocated_binary(&exe)
            }
        };
        if !cli.json && config.format == OutputFormat::Default {
            println!("{}", display::format_configuration(&config.workload));
        }
        config.workload.command_line(&binary)?
    } else {
        CommandLine::from_argv(&cli.command)?
    };

    let sampler = SysinfoSampler::new()?;
    let report = Monitor::launch(&command, sampler, monitor_config)?.run()?;

    let output = if cli.json {
        display::format_json(&report)
    } else {
        match config.format {
            OutputFormat::Short => display::format_short(&report),
            OutputFormat::Default => display::format_default(&report),
        }
    };
    print!("{}", output);

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("{}", err);
        process::exit(1);
    }
}

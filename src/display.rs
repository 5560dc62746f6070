use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use crate::types::UsageReport;
use crate::workload::WorkloadParams;

/// Configuration line printed before the benchmark starts.
pub fn format_configuration(params: &WorkloadParams) -> String {
    format!(
        "Running with buffer_size: {}\tconsumers: {}/{}s\tproducers:{}/{}s",
        params.buffer_size,
        params.consumers,
        params.consumer_delay,
        params.producers,
        params.producer_delay
    )
}

/// The report line: average CPU usage and run time, two decimals each.
pub fn format_default(report: &UsageReport) -> String {
    let usage = format!("{:.2}", report.average_cpu);
    let run_time = format!("{:.2}s", report.elapsed.as_secs_f64());
    format!(
        "Avg. CPU usage: {}\tRun time: {}\n",
        usage.if_supports_color(Stream::Stdout, |s| s.cyan()),
        run_time.if_supports_color(Stream::Stdout, |s| s.yellow()),
    )
}

/// Two bare numbers for scripts: `<avg cpu> <seconds>`.
pub fn format_short(report: &UsageReport) -> String {
    format!(
        "{:.2} {:.2}\n",
        report.average_cpu,
        report.elapsed.as_secs_f64()
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    average_cpu_percent: f64,
    elapsed_secs: f64,
    samples: usize,
    cores: usize,
    started_at: String,
    exit_code: Option<i32>,
    command: &'a str,
}

pub fn format_json(report: &UsageReport) -> String {
    let json = JsonReport {
        average_cpu_percent: round2(report.average_cpu),
        elapsed_secs: round2(report.elapsed.as_secs_f64()),
        samples: report.samples,
        cores: report.cores,
        started_at: report.started_at.to_rfc3339(),
        exit_code: report.exit.code,
        command: &report.command,
    };

    let mut out = serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use crate::dataset::format_charge_key;
use crate::error::{CliError, Result};
use ptmcharge::core::models::distribution::Distribution;
use ptmcharge::core::models::support::Support;
use ptmcharge::engine::config::AgreementBands;
use ptmcharge::workflows::benchmark::{BenchmarkOutcome, BenchmarkReport};
use ptmcharge::workflows::compare::ComparisonReport;
use ptmcharge::workflows::compute::ComputeResult;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Inclusive charge range shown in console summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    low: i64,
    high: i64,
}

impl DisplayWindow {
    pub fn new(low: i64, high: i64) -> Option<Self> {
        (low <= high).then_some(Self { low, high })
    }
}

impl FromStr for DisplayWindow {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (low, high) = s
            .split_once(':')
            .ok_or_else(|| format!("expected LOW:HIGH, got '{}'", s))?;
        let low: i64 = low
            .trim()
            .parse()
            .map_err(|_| format!("invalid lower bound '{}'", low))?;
        let high: i64 = high
            .trim()
            .parse()
            .map_err(|_| format!("invalid upper bound '{}'", high))?;
        Self::new(low, high).ok_or_else(|| format!("lower bound {} exceeds upper bound {}", low, high))
    }
}

/// A distribution cut down to a display window plus the mass on either side of it.
///
/// Rows only cover the part of the window inside the distribution's support, so an
/// arbitrarily wide window never allocates more rows than the distribution has.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedView {
    pub below: f64,
    pub rows: Vec<(i64, f64)>,
    pub above: f64,
}

impl WindowedView {
    pub fn new(distribution: &Distribution, window: DisplayWindow) -> Self {
        let shown = Support::new(window.low, window.high)
            .ok()
            .and_then(|window| window.intersection(&distribution.support()));
        let mut view = Self {
            below: 0.0,
            rows: shown
                .map(|shown| {
                    shown
                        .charges()
                        .map(|charge| (charge, distribution.probability_at(charge)))
                        .collect()
                })
                .unwrap_or_default(),
            above: 0.0,
        };
        for (charge, p) in distribution.iter() {
            if charge < window.low {
                view.below += p;
            } else if charge > window.high {
                view.above += p;
            }
        }
        view
    }

    pub fn total(&self) -> f64 {
        self.below + self.above + self.rows.iter().map(|(_, p)| p).sum::<f64>()
    }
}

#[derive(Serialize)]
struct PmfRow {
    charge: i64,
    probability: f64,
}

/// Writes every charge of the support as a `charge,probability` row.
pub fn write_csv(path: &Path, distribution: &Distribution) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (charge, probability) in distribution.iter() {
        writer.serialize(PmfRow {
            charge,
            probability,
        })?;
    }
    writer.flush().map_err(CliError::Io)
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1e3
}

pub fn render_compute(result: &ComputeResult, window: DisplayWindow) -> String {
    let distribution = &result.distribution;
    let selection = &result.selection;
    let view = WindowedView::new(distribution, window);
    let (mode, mode_p) = distribution.mode();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Method: {} ({}){}",
        selection.method.label(),
        selection.reason,
        if selection.method.is_exact() { "" } else { " [approximation]" }
    );
    let _ = writeln!(
        out,
        "Total copies: {}   Support: {}   Time: {:.2} ms",
        selection.total_copies,
        distribution.support(),
        millis(result.elapsed)
    );
    let _ = writeln!(
        out,
        "Mean: {:.4}   Std dev: {:.4}   Mode: {} (p = {:.6})",
        distribution.mean(),
        distribution.variance().sqrt(),
        format_charge_key(mode),
        mode_p
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>8}  {:>14}", "Charge", "Probability");
    let _ = writeln!(out, "{:>8}  {:>14.6e}", format!("< {}", window.low), view.below);
    for (charge, p) in &view.rows {
        let _ = writeln!(out, "{:>8}  {:>14.6e}", format_charge_key(*charge), p);
    }
    let _ = writeln!(out, "{:>8}  {:>14.6e}", format!("> {}", window.high), view.above);
    out
}

pub fn render_comparison(report: &ComparisonReport, bands: &AgreementBands) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({:.2} ms) vs {} ({:.2} ms)",
        report.method_a().label(),
        millis(report.elapsed_a()),
        report.method_b().label(),
        millis(report.elapsed_b())
    );
    let _ = writeln!(out, "Common support: {}", report.support());
    let _ = writeln!(
        out,
        "Max |diff|: {:.3e} at charge {}",
        report.max_abs_diff(),
        format_charge_key(report.max_abs_diff_charge())
    );
    let _ = writeln!(out, "RMS diff: {:.3e}", report.rmse());
    let _ = writeln!(out, "Agreement: {}", report.agreement(bands));
    out
}

pub fn render_benchmark(report: &BenchmarkReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Reference: {}   Total copies: {}",
        report.benchmark.label(),
        report.total_copies
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<24} {:>12} {:>12} {:>12}  {}",
        "Method", "Time (ms)", "Max |diff|", "RMS diff", "Agreement"
    );
    for entry in &report.entries {
        let time = entry
            .elapsed
            .map_or_else(|| "-".to_string(), |e| format!("{:.2}", millis(e)));
        let line = match &entry.outcome {
            BenchmarkOutcome::Benchmark => format!(
                "{:<24} {:>12} {:>12} {:>12}  reference",
                entry.method.label(),
                time,
                "-",
                "-"
            ),
            BenchmarkOutcome::Compared { report, agreement } => format!(
                "{:<24} {:>12} {:>12.3e} {:>12.3e}  {}",
                entry.method.label(),
                time,
                report.max_abs_diff(),
                report.rmse(),
                agreement
            ),
            BenchmarkOutcome::Failed { error } => format!(
                "{:<24} {:>12} {:>12} {:>12}  failed: {}",
                entry.method.label(),
                time,
                "-",
                "-",
                error
            ),
        };
        let _ = writeln!(out, "{}", line);
    }
    out
}

//! Command-line front end for the test selection solver.
//!
//! Reads an instance file, solves it, and prints the instance followed by
//! a one-line JSON report.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use select_mip::{solve, Instance, Settings, SolveError};

#[derive(Parser)]
#[command(name = "select", version, about = "Minimum-cost distinguishing test selection")]
struct Cli {
    /// Instance file: n, m, cost line, then n rows of m binary responses.
    instance: PathBuf,

    /// Node budget for the search.
    #[arg(long)]
    max_nodes: Option<u64>,

    /// Wall-clock limit in seconds.
    #[arg(long)]
    time_limit: Option<f64>,

    /// Print search progress.
    #[arg(short, long)]
    verbose: bool,
}

/// One-line report printed after the instance. The numeric fields are
/// rendered as strings, matching the legacy report format downstream
/// tooling parses.
#[derive(Serialize)]
struct Report<'a> {
    #[serde(rename = "Instance")]
    instance: &'a str,

    /// Wall-clock seconds, rounded to centiseconds.
    #[serde(rename = "Time")]
    time: String,

    /// Total cost of the selected tests (0 when infeasible).
    #[serde(rename = "Result")]
    result: String,

    #[serde(rename = "Solution")]
    solution: &'a str,
}

/// Round to two decimals and render the way the legacy reports do:
/// integral values keep one decimal place ("2.0"), others print minimally.
fn fmt_rounded(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(filter)
        .init();

    let instance = Instance::from_file(&cli.instance)
        .with_context(|| format!("reading instance {}", cli.instance.display()))?;
    println!("{instance}");

    let mut settings = Settings::default();
    settings.verbose = cli.verbose;
    if let Some(nodes) = cli.max_nodes {
        settings = settings.with_max_nodes(nodes);
    }
    if let Some(seconds) = cli.time_limit {
        settings = settings.with_time_limit(seconds);
    }

    let start = Instant::now();
    let (result, tag) = match solve(&instance, &settings) {
        Ok(solution) => {
            if !solution.selected.is_empty() {
                log::info!("selected tests: {:?}", solution.selected);
            }
            let result = if solution.has_solution() {
                solution.objective
            } else {
                0.0
            };
            (result, solution.status_tag())
        }
        // An indistinguishable disease pair is an answer, not a crash.
        Err(SolveError::Infeasible { i, j }) => {
            log::warn!("diseases {i} and {j} have identical response patterns");
            (0.0, "INFEASIBLE")
        }
        Err(err) => return Err(err).context("solving instance"),
    };
    let elapsed = start.elapsed().as_secs_f64();

    let name = cli
        .instance
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let report = Report {
        instance: name.as_ref(),
        time: fmt_rounded(elapsed),
        result: fmt_rounded(result),
        solution: tag,
    };
    println!("{}", serde_json::to_string(&report)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_renders_numbers_as_strings() {
        let report = Report {
            instance: "example.txt",
            time: fmt_rounded(0.1234),
            result: fmt_rounded(2.0),
            solution: "OPT",
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"Instance":"example.txt","Time":"0.12","Result":"2.0","Solution":"OPT"}"#
        );
    }

    #[test]
    fn test_fmt_rounded() {
        assert_eq!(fmt_rounded(0.0), "0.0");
        assert_eq!(fmt_rounded(1.5), "1.5");
        assert_eq!(fmt_rounded(1.25), "1.25");
        assert_eq!(fmt_rounded(1.999), "2.0");
    }
}

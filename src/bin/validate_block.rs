//! Validate a block of allocation groups in parallel
//!
//! Reads a CSV of allocation groups and writes one report row per group with
//! its total, remaining delta and any violations.
//!
//! Usage: cargo run --bin validate_block -- data/allocations.csv --output allocation_report.csv

use anyhow::Context;
use clap::Parser;
use coverage_workflow::allocation::{self, loader::DEFAULT_ALLOCATIONS_PATH, AllocationCheck, AllocationGroup};
use coverage_workflow::Violation;
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(about = "Validate every allocation group in a CSV file")]
struct Args {
    #[arg(default_value = DEFAULT_ALLOCATIONS_PATH)]
    input: PathBuf,

    #[arg(long, default_value = "allocation_report.csv")]
    output: PathBuf,
}

/// One output row per allocation group
#[derive(Debug, Serialize)]
struct ReportRow {
    #[serde(rename = "Group")]
    group: String,
    #[serde(rename = "Entries")]
    entries: usize,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Delta")]
    delta: f64,
    #[serde(rename = "Valid")]
    valid: bool,
    #[serde(rename = "Violations")]
    violations: String,
}

fn report(group: &AllocationGroup) -> ReportRow {
    let result = AllocationCheck::of(&group.entries);

    ReportRow {
        group: group.name.clone(),
        entries: group.entries.len(),
        total: result.verdict.total(),
        delta: result.verdict.delta(),
        valid: result.is_ok(),
        violations: result
            .violations()
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading allocation groups from {}...", args.input.display());
    let groups = allocation::load_groups(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    println!("Loaded {} groups in {:?}", groups.len(), start.elapsed());

    let check_start = Instant::now();
    let rows: Vec<ReportRow> = groups.par_iter().map(report).collect();
    println!("Validated in {:?}", check_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let invalid = rows.iter().filter(|r| !r.valid).count();
    println!("\nSummary:");
    println!("  Groups:  {}", rows.len());
    println!("  Valid:   {}", rows.len() - invalid);
    println!("  Invalid: {}", invalid);
    println!("\nReport written to: {}", args.output.display());

    Ok(())
}

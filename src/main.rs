//! Coverage Workflow CLI
//!
//! Command-line front end for validating allocation and limit files and for
//! walking a wizard configuration against a product session

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use coverage_workflow::allocation::{self, loader::DEFAULT_ALLOCATIONS_PATH};
use coverage_workflow::insured::{self, InsuredSnapshot};
use coverage_workflow::limits::{self, loader::DEFAULT_LIMITS_PATH};
use coverage_workflow::wizard::{StepTracker, Transition, WizardConfig, DEFAULT_WIZARD_PATH};
use coverage_workflow::{InsuredKind, ProductStatus, SessionContext, Violation};

const DEFAULT_INSURED_PATH: &str = "data/insured.json";

#[derive(Debug, Parser)]
#[command(name = "coverage_workflow", version, about = "Product configuration workflow engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that every allocation group totals 100% with unique keys
    ValidateAllocations {
        #[arg(default_value = DEFAULT_ALLOCATIONS_PATH)]
        path: PathBuf,
    },

    /// Check child aggregate limits against their parents
    CheckLimits {
        #[arg(default_value = DEFAULT_LIMITS_PATH)]
        path: PathBuf,
    },

    /// Step through a wizard configuration for a product session
    Walk {
        #[arg(long, default_value = DEFAULT_WIZARD_PATH)]
        config: PathBuf,

        #[arg(long, default_value = "P-1000")]
        product_id: String,

        #[arg(long, default_value = "US")]
        country: String,

        #[arg(long, default_value = "draft")]
        status: ProductStatus,

        /// Insured snapshot supplying the product's insured composition
        #[arg(long = "insured", default_value = DEFAULT_INSURED_PATH)]
        snapshot: PathBuf,

        /// Maximum number of forward moves
        #[arg(long, default_value_t = 32)]
        steps: usize,
    },

    /// Resolve the next incomplete insured entity
    NextInsured {
        #[arg(long = "insured", default_value = DEFAULT_INSURED_PATH)]
        snapshot: PathBuf,

        /// Key of the entity just saved
        #[arg(long)]
        current: Option<String>,

        #[arg(long, default_value = "/coverage-variants")]
        default_route: String,
    },
}

fn load_snapshot(path: &Path) -> anyhow::Result<InsuredSnapshot> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    InsuredSnapshot::from_json_reader(BufReader::new(file))
        .with_context(|| format!("decoding insured snapshot {}", path.display()))
}

fn validate_allocations(path: &Path) -> anyhow::Result<()> {
    let groups = allocation::load_groups(path)
        .with_context(|| format!("loading allocations from {}", path.display()))?;

    let mut failed = 0;
    for group in &groups {
        let violations = allocation::check(&group.entries);
        if violations.iter().any(Violation::blocks_save) {
            failed += 1;
            println!("  {:<20} FAILED", group.name);
        } else {
            println!("  {:<20} OK", group.name);
        }
        for v in &violations {
            println!("      - {}", v);
        }
    }

    println!("\n{} of {} groups valid", groups.len() - failed, groups.len());
    if failed > 0 {
        bail!("{} allocation group(s) failed validation", failed);
    }
    Ok(())
}

fn check_limits(path: &Path) -> anyhow::Result<()> {
    let levels = limits::load_levels(path)
        .with_context(|| format!("loading limit levels from {}", path.display()))?;

    for level in &levels {
        println!(
            "  {:<14} parent={:<14} limit={} {:<12} aggregate={} {}",
            level.key,
            level.parent_key.as_deref().unwrap_or("-"),
            level.spec.mode(),
            limits::effective_value(&level.spec),
            level.spec.aggregate_mode(),
            limits::effective_aggregate(&level.spec),
        );
    }

    let violations = limits::validate_hierarchy(&levels);
    if violations.is_empty() {
        println!("\nAll {} levels consistent", levels.len());
        return Ok(());
    }

    println!();
    for v in &violations {
        println!("  - {}", v);
    }
    bail!("{} limit violation(s)", violations.len());
}

fn walk(config: &Path, session: SessionContext, steps: usize) -> anyhow::Result<()> {
    let config = WizardConfig::from_path(config)
        .with_context(|| format!("loading wizard config {}", config.display()))?;
    let mut tracker = StepTracker::for_session(config, session)?;

    println!("{:>4} {:>4}  {:<26} Route", "Step", "Sub", "Label");
    println!("{}", "-".repeat(80));

    for _ in 0..=steps {
        let (step, sub_step) = tracker.position().coordinates();
        let route = tracker.current_route()?;
        println!(
            "{:>4} {:>4}  {:<26} {}",
            step,
            sub_step,
            tracker.current_label().unwrap_or("?"),
            route
        );

        match tracker.advance(1) {
            Ok(Transition::Completed { .. }) => {}
            Ok(Transition::AtBoundary { .. }) => {
                println!("\nReached the last wizard position");
                break;
            }
            Ok(blocked @ Transition::Blocked { step, sub_step, .. }) => {
                let label = tracker.config().label_at(step, sub_step).unwrap_or("?");
                if let Some(v) = blocked.violation() {
                    println!("\nStopped: {} ({})", v, label);
                }
                break;
            }
            Err(never) => match never {},
        }
    }

    Ok(())
}

fn next_insured(path: &Path, current: Option<&str>, default_route: &str) -> anyhow::Result<()> {
    let snapshot = load_snapshot(path)?;
    let progress = insured::progress(snapshot.entities());
    if progress.is_finished() {
        println!("All {} insured entities complete", progress.total);
    } else {
        println!(
            "{} of {} insured entities complete, {} remaining",
            progress.complete,
            progress.total,
            progress.remaining()
        );
    }

    let target = insured::next_target(snapshot.entities(), current, default_route);
    match target.entity() {
        Some(entity) => println!("Next: {} {} -> {}", entity.kind, entity.key, target.destination()),
        None => println!("Nothing left to complete -> {}", target.destination()),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::ValidateAllocations { path } => validate_allocations(&path),
        Command::CheckLimits { path } => check_limits(&path),
        Command::Walk {
            config,
            product_id,
            country,
            status,
            snapshot,
            steps,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let session = SessionContext::new(product_id, country)
                .with_status(status)
                .with_snapshot(&snapshot);
            let kinds: Vec<String> = session.insured_kinds.iter().map(InsuredKind::to_string).collect();
            println!(
                "Product {} ({}, {}), insured: {}\n",
                session.product_id,
                session.country,
                session.product_status,
                kinds.join(", ")
            );
            walk(&config, session, steps)
        }
        Command::NextInsured {
            snapshot,
            current,
            default_route,
        } => next_insured(&snapshot, current.as_deref(), &default_route),
    }
}

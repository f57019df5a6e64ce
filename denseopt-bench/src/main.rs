//! Fixture runner CLI for the denseopt solvers.

mod fixture;
mod runner;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "denseopt-bench")]
#[command(about = "Fixture runner for the denseopt LP/QP solvers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every lp_*.txt and qp_*.txt fixture in a directory
    Run {
        /// Directory containing the fixture files
        dir: PathBuf,
        /// Write a machine-readable JSON report to this path
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Parse a fixture file and show its dimensions
    Info {
        /// Path to an lp_*.txt or qp_*.txt fixture
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { dir, json } => {
            let summary = runner::run_directory(&dir)?;

            for case in &summary.cases {
                let status = if case.passed { "PASS" } else { "FAIL" };
                println!("{:<4} {:<24} {}", status, case.name, case.detail);
            }
            println!();
            println!(
                "{} fixtures, {} passed, {} failed",
                summary.total, summary.passed, summary.failed
            );

            if let Some(path) = json {
                let report = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&path, report)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("report written to {}", path.display());
            }

            if summary.failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Info { path } => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            if name.starts_with("lp_") {
                let lp = fixture::load_lp(&path)?;
                println!("LP fixture {}", path.display());
                println!("  feasible:     {}", lp.feasible);
                println!("  variables:    {}", lp.f.len());
                println!("  equalities:   {}", lp.a.nrows());
                println!("  inequalities: {}", lp.c.nrows());
            } else if name.starts_with("qp_") {
                let qp = fixture::load_qp(&path)?;
                println!("QP fixture {}", path.display());
                println!("  feasible:      {}", qp.feasible);
                println!("  variables:     {}", qp.q.ncols());
                println!("  objective rows: {}", qp.q.nrows());
                println!("  equalities:    {}", qp.a.nrows());
                println!("  inequalities:  {}", qp.c.nrows());
            } else {
                bail!("fixture files must be named lp_*.txt or qp_*.txt");
            }
            Ok(())
        }
    }
}

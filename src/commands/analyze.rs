use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use tracing::warn;
use vix_term::analyzer::{AnalysisReport, TermStructureAnalyzer};
use vix_term::config::EngineConfig;
use vix_term::data;
use vix_term::model::SnapshotInput;
use vix_term::model::snapshot::parse_timestamp;
use vix_term::report;

pub struct AnalyzeArgs {
    pub input: Option<PathBuf>,
    pub spot: Option<f64>,
    pub futures: Option<PathBuf>,
    pub timestamp: Option<String>,
    pub no_historical: bool,
    pub json: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// Entry point for the `analyze` command.
pub fn run(args: &AnalyzeArgs, db: &Path, config: &EngineConfig) -> Result<()> {
    let input = load_input(args)?;
    let timestamp = match &args.timestamp {
        Some(s) => parse_timestamp(s).with_context(|| format!("invalid timestamp `{s}`"))?,
        None => Local::now().naive_local(),
    };

    println!("=== vix-term analyze ===");
    println!("VIX Spot: {:.2}", input.spot_price);
    println!("Futures contracts: {}", input.contracts.len());

    let report = analyze(&input, timestamp, args.no_historical, db, config);
    print_results(&report);

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing analysis JSON to {}", path.display()))?;
        println!("\nAnalysis written to {}", path.display());
    }
    if let Some(path) = &args.summary {
        std::fs::write(path, report::render_summary(&report))
            .with_context(|| format!("writing summary to {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

fn load_input(args: &AnalyzeArgs) -> Result<SnapshotInput> {
    let input = match (&args.input, args.spot, &args.futures) {
        (Some(path), _, _) => data::load_snapshot(path)?,
        (None, Some(spot), Some(futures)) => data::snapshot_from_csv(spot, futures)?,
        _ => bail!("provide either --input <json> or --spot <level> --futures <csv>"),
    };
    Ok(input)
}

/// Run the analyzer, degrading to a snapshot-only analysis when the
/// history database cannot be opened.
fn analyze(
    input: &SnapshotInput,
    timestamp: NaiveDateTime,
    no_historical: bool,
    db: &Path,
    config: &EngineConfig,
) -> AnalysisReport {
    if no_historical {
        return TermStructureAnalyzer::without_history(config).analyze(input, timestamp);
    }

    let mut store = match super::open_store(db, config) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "history unavailable, analysing without it");
            return TermStructureAnalyzer::without_history(config).analyze(input, timestamp);
        }
    };
    let report = TermStructureAnalyzer::new(&mut store, config).analyze(input, timestamp);
    if let Err(e) = store.close() {
        warn!(error = %e, "closing history database failed");
    }
    report
}

fn print_results(report: &AnalysisReport) {
    let snap = &report.snapshot;
    println!("\nAnalysis Results:");
    println!("   Spot to Front: {:.2} points", snap.spreads.spot_to_front);
    println!("   Front to Second: {:.2} points", snap.spreads.front_to_second);
    println!("   Roll Carry: {:.2}%", snap.roll_carry.roll_pct);
    println!("   Curve Shape: {}", snap.curve_shape);
    println!("   Trading Signal: {}", snap.trading_signal);
    if !snap.inversions.is_empty() {
        println!("   Inversions: {}", snap.inversions.len());
    }

    if let Some(history) = &report.history {
        println!("\nHistorical: {}", history.changes.summary());
    }
    if let Some(ctx) = &report.statistical_context {
        for insight in &ctx.insights {
            println!("   - {insight}");
        }
    }
    if let Some(e) = &report.storage_error {
        println!("\nWarning: snapshot not stored ({e})");
    }
}

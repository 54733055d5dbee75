use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// VIX term structure analytics: analyse a futures curve, keep its history
/// and place today's numbers in historical context.
#[derive(Parser)]
#[command(name = "vix-term", version, about)]
pub struct Cli {
    /// SQLite history database (default: <data dir>/vix-term/vix_historical.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Engine configuration JSON (lookback windows, thresholds)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for the analysis input document
    Schema,

    /// Analyse one snapshot of spot VIX and its futures curve
    Analyze {
        /// Input JSON: {"spot_price": .., "contracts": [..]}
        #[arg(long, conflicts_with_all = ["spot", "futures"])]
        input: Option<PathBuf>,

        /// Spot VIX level (use with --futures)
        #[arg(long, requires = "futures")]
        spot: Option<f64>,

        /// Futures CSV: symbol,price,days_to_expiration[,expiration_date]
        #[arg(long, requires = "spot")]
        futures: Option<PathBuf>,

        /// Snapshot timestamp (ISO-8601, default: now, local time)
        #[arg(long)]
        timestamp: Option<String>,

        /// Skip storage, day-over-day changes and statistics
        #[arg(long)]
        no_historical: bool,

        /// Write the full analysis as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the readable text summary to this file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Import legacy analysis JSON files from a directory into the database
    Migrate {
        /// Directory containing *.json analysis files
        dir: PathBuf,
    },

    /// Show database statistics
    Info,

    /// List stored snapshots from the last N days
    History {
        /// Number of calendar days to look back
        #[arg(long, default_value = "30")]
        days: u32,
    },
}

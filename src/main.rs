use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vix_term::config::EngineConfig;

mod cli;
mod commands;

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vix_term=info"));

    // Logs go to stderr so command output on stdout stays pipeable.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = cli::Cli::parse();

    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    let db = cli.db.unwrap_or_else(commands::default_db_path);

    match cli.command {
        cli::Command::Schema => vix_term::schema::run(),
        cli::Command::Analyze {
            input,
            spot,
            futures,
            timestamp,
            no_historical,
            json,
            summary,
        } => commands::analyze::run(
            &commands::analyze::AnalyzeArgs {
                input,
                spot,
                futures,
                timestamp,
                no_historical,
                json,
                summary,
            },
            &db,
            &config,
        ),
        cli::Command::Migrate { dir } => commands::migrate::run(&dir, &db, &config),
        cli::Command::Info => commands::info::run(&db, &config),
        cli::Command::History { days } => commands::history::run(days, &db, &config),
    }
}

mod cli;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use fundguard::config::{Config, DEFAULT_LOG_FILTER};
use fundguard::{BudgetEngine, Database};

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let db_flag = cli::take_flag(&mut args, "--db")?;
    let config = Config::resolve(db_flag.as_deref())?;
    init_tracing(&config.log_filter);

    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {}", config.db_path.display()))?;
    let mut engine = BudgetEngine::new(db);
    cli::run(&args, &mut engine)
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

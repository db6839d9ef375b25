use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use banks_etl::fetch::HttpSourceFetcher;
use banks_etl::{load, logging, query, Config, Pipeline};

#[derive(Parser)]
#[command(name = "banks-etl")]
#[command(about = "ETL pipeline for the largest-banks-by-market-cap ranking")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: extract, transform, load, report
    Run {
        /// Path to the TOML configuration file
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Run an ad-hoc read-only SQL query against a loaded database
    Query {
        /// SQL statement to execute
        sql: String,
        /// Path to the SQLite database written by a previous run
        #[arg(long, default_value = "Banks.db")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    logging::init_logging();

    match cli.command {
        Commands::Run { config } => {
            let config = Config::load(&config)?;
            let pipeline = Pipeline::new(config);
            let fetcher = HttpSourceFetcher::new();
            let result = pipeline.run(&fetcher).await?;
            info!(
                "Loaded {} record(s) into {} and table {}",
                result.records_loaded,
                result.csv_path.display(),
                result.table_name
            );
        }
        Commands::Query { sql, db } => {
            let conn = load::open_sink(&db)?;
            query::run(&sql, &conn)?;
        }
    }

    Ok(())
}

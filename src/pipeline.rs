use crate::config::Config;
use crate::error::Result;
use crate::extract::{self, ExpectedColumns};
use crate::fetch::SourceFetcher;
use crate::progress::ProgressLog;
use crate::{load, query, rates, transform};
use tracing::{debug, info};

/// Outcome of a completed run.
#[derive(Debug)]
pub struct PipelineResult {
    pub records_loaded: usize,
    pub csv_path: std::path::PathBuf,
    pub db_path: std::path::PathBuf,
    pub table_name: String,
}

/// The batch ETL run: fetch -> extract -> load rates -> transform -> load
/// (file, table) -> reporting queries. Strictly sequential and fail-fast;
/// every stage returns a typed result and the driver short-circuits on the
/// first error. A progress line is recorded only after a stage completes, so
/// a truncated progress file shows where a failed run stopped.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self, fetcher: &dyn SourceFetcher) -> Result<PipelineResult> {
        let config = &self.config;
        let progress = ProgressLog::new(config.output.progress_log.clone());
        progress.record("Preliminaries complete. Initiating ETL process");

        let tables = fetcher.fetch(&config.source.url).await?;
        let columns = ExpectedColumns {
            name: config.source.name_column.clone(),
            market_cap: config.source.market_cap_column.clone(),
        };
        let records = extract::extract(&tables, &config.table_selector(), &columns)?;
        debug!("Extracted records: {records:?}");
        progress.record("Data extraction complete. Initiating Transformation process");

        let rate_table = rates::load(&config.rates.path)?;
        let dataset = transform::transform(&records, &rate_table)?;
        debug!("Transformed dataset: {dataset:?}");
        progress.record("Data transformation complete. Initiating Loading process");

        load::save_file(&dataset, &config.output.csv_path)?;
        progress.record("Data saved to CSV file");

        // The connection is owned by this scope and dropped when the run
        // ends, on failure paths included.
        let mut conn = load::open_sink(&config.output.db_path)?;
        progress.record("SQL Connection initiated");

        load::save_table(&dataset, &mut conn, &config.output.table_name)?;
        progress.record("Data loaded to Database as a table, Executing queries");

        for sql in &config.report.queries {
            query::run(sql, &conn)?;
        }
        progress.record("Process Complete");

        info!(
            "Pipeline complete: {} record(s) loaded into {} and {}",
            dataset.len(),
            config.output.csv_path.display(),
            config.output.table_name
        );
        Ok(PipelineResult {
            records_loaded: dataset.len(),
            csv_path: config.output.csv_path.clone(),
            db_path: config.output.db_path.clone(),
            table_name: config.output.table_name.clone(),
        })
    }
}

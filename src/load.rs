use crate::error::{EtlError, Result};
use crate::transform::EnrichedBankRecord;
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;
use tracing::info;

/// Column names shared by the CSV header and the relational table.
pub const OUTPUT_COLUMNS: [&str; 5] = [
    "Name",
    "MC_USD_Billion",
    "MC_GBP_Billion",
    "MC_EUR_Billion",
    "MC_INR_Billion",
];

/// Serializes the dataset to a delimited file, header row first, in dataset
/// order. The write goes to a sibling temp file that is renamed over `path`,
/// so a prior file is never left partially overwritten.
pub fn save_file(dataset: &[EnrichedBankRecord], path: &Path) -> Result<()> {
    let write_err = |reason: String| EtlError::SinkWriteError {
        path: path.to_path_buf(),
        reason,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(OUTPUT_COLUMNS)
        .map_err(|e| write_err(e.to_string()))?;
    for record in dataset {
        writer
            .write_record([
                record.name.clone(),
                record.market_cap_usd.to_string(),
                record.market_cap_gbp.to_string(),
                record.market_cap_eur.to_string(),
                record.market_cap_inr.to_string(),
            ])
            .map_err(|e| write_err(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| write_err(e.to_string()))?;

    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, &bytes).map_err(|e| write_err(e.to_string()))?;
    fs::rename(&tmp_path, path).map_err(|e| write_err(e.to_string()))?;
    info!("Wrote {} record(s) to {}", dataset.len(), path.display());
    Ok(())
}

/// Opens the file-backed relational sink. The connection is owned by the run
/// scope that called this and is released when that scope ends, including on
/// failure.
pub fn open_sink(path: &Path) -> Result<Connection> {
    Connection::open(path).map_err(|e| EtlError::SinkConnectionError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Writes the dataset into `table_name` with replace semantics: the table is
/// dropped and recreated with this run's data, never appended to or merged.
/// Runs in one transaction so a failed load leaves no half-written table.
pub fn save_table(
    dataset: &[EnrichedBankRecord],
    conn: &mut Connection,
    table_name: &str,
) -> Result<()> {
    let db_path = conn.path().map(std::path::PathBuf::from).unwrap_or_default();
    let write_err = |reason: String| EtlError::SinkWriteError {
        path: db_path.clone(),
        reason,
    };

    let tx = conn.transaction().map_err(|e| write_err(e.to_string()))?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table_name}\";
         CREATE TABLE \"{table_name}\" (
             Name TEXT NOT NULL,
             MC_USD_Billion REAL NOT NULL,
             MC_GBP_Billion REAL NOT NULL,
             MC_EUR_Billion REAL NOT NULL,
             MC_INR_Billion REAL NOT NULL
         );"
    ))
    .map_err(|e| write_err(e.to_string()))?;

    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO \"{table_name}\" \
                 (Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion) \
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ))
            .map_err(|e| write_err(e.to_string()))?;
        for record in dataset {
            stmt.execute(params![
                record.name,
                record.market_cap_usd,
                record.market_cap_gbp,
                record.market_cap_eur,
                record.market_cap_inr,
            ])
            .map_err(|e| write_err(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| write_err(e.to_string()))?;
    info!(
        "Loaded {} record(s) into table {}",
        dataset.len(),
        table_name
    );
    Ok(())
}

use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Currency code -> units of that currency per 1 USD. Loaded once per run and
/// read-only afterwards.
pub type ExchangeRateTable = HashMap<String, f64>;

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: String,
}

/// Loads the `Currency,Rate` CSV. A repeated currency code is a
/// data-integrity error, never resolved last-wins; rates must be positive
/// finite numbers.
pub fn load(path: &Path) -> Result<ExchangeRateTable> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| EtlError::RateFileUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut rates = ExchangeRateTable::new();
    for row in reader.deserialize() {
        let row: RateRow = row.map_err(|e| EtlError::RateFileUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let code = row.currency.trim().to_string();
        let rate: f64 = row
            .rate
            .trim()
            .parse()
            .map_err(|_| EtlError::InvalidRate {
                code: code.clone(),
                raw: row.rate.clone(),
            })?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EtlError::InvalidRate {
                code,
                raw: row.rate,
            });
        }
        if rates.insert(code.clone(), rate).is_some() {
            return Err(EtlError::DuplicateCurrency { code });
        }
    }
    info!("Loaded {} exchange rate(s) from {}", rates.len(), path.display());
    Ok(rates)
}

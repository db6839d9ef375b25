use crate::error::{EtlError, Result};
use crate::extract::BankRecord;
use crate::rates::ExchangeRateTable;
use tracing::info;

/// The fixed currency set every run derives. Rates beyond these are ignored.
pub const REQUIRED_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

/// A `BankRecord` with the derived currency columns, each rounded to 2
/// decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBankRecord {
    pub name: String,
    pub market_cap_usd: f64,
    pub market_cap_gbp: f64,
    pub market_cap_eur: f64,
    pub market_cap_inr: f64,
}

/// Derives GBP/EUR/INR market caps for every record. Atomic: if any required
/// rate is missing the whole transform fails, there is no degraded output
/// with partial columns. Order is preserved.
pub fn transform(
    records: &[BankRecord],
    rates: &ExchangeRateTable,
) -> Result<Vec<EnrichedBankRecord>> {
    for code in REQUIRED_CURRENCIES {
        if !rates.contains_key(code) {
            return Err(EtlError::MissingRate {
                code: code.to_string(),
            });
        }
    }
    let gbp = rates["GBP"];
    let eur = rates["EUR"];
    let inr = rates["INR"];

    let enriched: Vec<EnrichedBankRecord> = records
        .iter()
        .map(|r| EnrichedBankRecord {
            name: r.name.clone(),
            market_cap_usd: r.market_cap_usd,
            market_cap_gbp: round2(r.market_cap_usd * gbp),
            market_cap_eur: round2(r.market_cap_usd * eur),
            market_cap_inr: round2(r.market_cap_usd * inr),
        })
        .collect();
    info!("Transformed {} record(s) into {} currencies", enriched.len(), 1 + REQUIRED_CURRENCIES.len());
    Ok(enriched)
}

/// Rounds half away from zero at 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

use crate::error::{EtlError, Result};
use crate::fetch::HtmlTable;
use tracing::{debug, info};

/// One row of the ranking: bank name and market capitalization in USD
/// billions. Immutable once parsed; rank order is carried by position.
#[derive(Debug, Clone, PartialEq)]
pub struct BankRecord {
    pub name: String,
    pub market_cap_usd: f64,
}

/// How to pick the ranking table out of the fetched document. Position is a
/// contract with the source page (the ranking is its 2nd table); header match
/// lets tests and alternate sources avoid that contract.
#[derive(Debug, Clone)]
pub enum TableSelector {
    Index(usize),
    HeaderContains(String),
}

/// The two logical columns projected from the ranking table.
#[derive(Debug, Clone)]
pub struct ExpectedColumns {
    pub name: String,
    pub market_cap: String,
}

/// Selects the ranking table and projects it into `BankRecord`s, preserving
/// source row order.
pub fn extract(
    tables: &[HtmlTable],
    selector: &TableSelector,
    columns: &ExpectedColumns,
) -> Result<Vec<BankRecord>> {
    let table = select_table(tables, selector)?;
    let name_idx = find_column(table, &columns.name)?;
    let cap_idx = find_column(table, &columns.market_cap)?;
    debug!(
        "Projecting columns: name={} (idx {}), market_cap={} (idx {})",
        columns.name, name_idx, columns.market_cap, cap_idx
    );

    let mut records = Vec::with_capacity(table.rows.len());
    for (row_idx, row) in table.rows.iter().enumerate() {
        let name = row
            .get(name_idx)
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default();
        let raw_cap = row.get(cap_idx).map(String::as_str).unwrap_or("");
        let market_cap_usd = parse_market_cap(raw_cap).ok_or_else(|| {
            EtlError::MalformedMarketCap {
                row: row_idx,
                raw: raw_cap.to_string(),
            }
        })?;
        records.push(BankRecord {
            name,
            market_cap_usd,
        });
    }
    info!("Extracted {} bank record(s)", records.len());
    Ok(records)
}

fn select_table<'a>(tables: &'a [HtmlTable], selector: &TableSelector) -> Result<&'a HtmlTable> {
    match selector {
        TableSelector::Index(index) => tables.get(*index).ok_or(EtlError::TableIndexOutOfRange {
            index: *index,
            count: tables.len(),
        }),
        TableSelector::HeaderContains(pattern) => {
            let needle = normalize_header(pattern);
            tables
                .iter()
                .find(|t| t.headers.iter().any(|h| normalize_header(h).contains(&needle)))
                .ok_or_else(|| EtlError::TableNotMatched {
                    pattern: pattern.clone(),
                })
        }
    }
}

fn find_column(table: &HtmlTable, column: &str) -> Result<usize> {
    let wanted = normalize_header(column);
    table
        .headers
        .iter()
        .position(|h| normalize_header(h) == wanted)
        .ok_or_else(|| EtlError::ColumnNotFound {
            column: column.to_string(),
        })
}

/// Header cells on the source page wrap across lines; compare them with
/// newlines stripped, whitespace collapsed, case-insensitively.
fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Market-cap cells arrive as text with embedded newline artifacts of
/// multi-line cell rendering. Strip those, then require a non-negative finite
/// number.
fn parse_market_cap(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('\n', "");
    let value: f64 = cleaned.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking_table() -> HtmlTable {
        HtmlTable {
            headers: vec![
                "Rank".to_string(),
                "Bank name".to_string(),
                "Market cap\n(US$ billion)".to_string(),
            ],
            rows: vec![
                vec!["1".into(), "JPMorgan Chase".into(), "432.92\n".into()],
                vec!["2".into(), "Bank of America".into(), "231.52\n".into()],
                vec!["3".into(), "ICBC".into(), "194.56\n".into()],
            ],
        }
    }

    fn columns() -> ExpectedColumns {
        ExpectedColumns {
            name: "Bank name".to_string(),
            market_cap: "Market cap (US$ billion)".to_string(),
        }
    }

    fn with_filler(table: HtmlTable) -> Vec<HtmlTable> {
        let filler = HtmlTable {
            headers: vec!["By country".to_string()],
            rows: vec![vec!["x".into()]],
        };
        vec![filler, table]
    }

    #[test]
    fn extracts_rows_in_rank_order() {
        let tables = with_filler(ranking_table());
        let records = extract(&tables, &TableSelector::Index(1), &columns()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "JPMorgan Chase");
        assert_eq!(records[0].market_cap_usd, 432.92);
        assert_eq!(records[2].name, "ICBC");
    }

    #[test]
    fn embedded_newline_is_stripped_before_parsing() {
        assert_eq!(parse_market_cap("123.45\n"), Some(123.45));
        assert_eq!(parse_market_cap("12\n3.45"), Some(123.45));
    }

    #[test]
    fn non_numeric_cell_is_malformed() {
        let mut table = ranking_table();
        table.rows[1][2] = "N/A".to_string();
        let tables = with_filler(table);
        let err = extract(&tables, &TableSelector::Index(1), &columns()).unwrap_err();
        match err {
            EtlError::MalformedMarketCap { row, raw } => {
                assert_eq!(row, 1);
                assert_eq!(raw, "N/A");
            }
            other => panic!("expected MalformedMarketCap, got {other}"),
        }
    }

    #[test]
    fn negative_market_cap_is_malformed() {
        assert_eq!(parse_market_cap("-1.0"), None);
        assert_eq!(parse_market_cap("inf"), None);
    }

    #[test]
    fn index_out_of_range_is_reported() {
        let tables = vec![ranking_table()];
        let err = extract(&tables, &TableSelector::Index(1), &columns()).unwrap_err();
        assert!(matches!(
            err,
            EtlError::TableIndexOutOfRange { index: 1, count: 1 }
        ));
    }

    #[test]
    fn missing_column_is_reported() {
        let tables = with_filler(ranking_table());
        let bad_columns = ExpectedColumns {
            name: "Institution".to_string(),
            market_cap: "Market cap (US$ billion)".to_string(),
        };
        let err = extract(&tables, &TableSelector::Index(1), &bad_columns).unwrap_err();
        assert!(matches!(err, EtlError::ColumnNotFound { column } if column == "Institution"));
    }

    #[test]
    fn header_match_selector_finds_the_ranking_table() {
        let tables = with_filler(ranking_table());
        let selector = TableSelector::HeaderContains("Market cap".to_string());
        let records = extract(&tables, &selector, &columns()).unwrap();
        assert_eq!(records[0].name, "JPMorgan Chase");
    }

    #[test]
    fn header_normalization_bridges_wrapped_headers() {
        // Page header wraps "Market cap" and "(US$ billion)" onto two lines.
        let tables = with_filler(ranking_table());
        let records = extract(&tables, &TableSelector::Index(1), &columns()).unwrap();
        assert_eq!(records.len(), 3);
    }
}

use crate::error::{EtlError, Result};
use rusqlite::types::Value;
use rusqlite::Connection;

/// Thin accessor over the relational sink: the caller supplies fully-formed
/// read-only SQL and gets the whole result set back. No construction or
/// escaping happens here. Printing the statement and every returned row is
/// part of the contract, the reporting use case reads that output.
pub fn run(sql: &str, conn: &Connection) -> Result<Vec<Vec<Value>>> {
    let query_err = |source: rusqlite::Error| EtlError::QueryExecutionError {
        sql: sql.to_string(),
        source,
    };

    let mut stmt = conn.prepare(sql).map_err(query_err)?;
    let column_count = stmt.column_count();
    let mut rows = stmt.query([]).map_err(query_err)?;

    let mut result = Vec::new();
    while let Some(row) = rows.next().map_err(query_err)? {
        let mut tuple = Vec::with_capacity(column_count);
        for i in 0..column_count {
            tuple.push(row.get::<_, Value>(i).map_err(query_err)?);
        }
        result.push(tuple);
    }

    println!("Query: {sql}");
    for tuple in &result {
        println!("{}", format_row(tuple));
    }
    Ok(result)
}

fn format_row(tuple: &[Value]) -> String {
    let cells: Vec<String> = tuple
        .iter()
        .map(|v| match v {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => format!("<{} bytes>", b.len()),
        })
        .collect();
    format!("({})", cells.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::save_table;
    use crate::transform::EnrichedBankRecord;

    fn loaded_conn(rows: usize) -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        let dataset: Vec<EnrichedBankRecord> = (0..rows)
            .map(|i| EnrichedBankRecord {
                name: format!("Bank {}", i + 1),
                market_cap_usd: (rows - i) as f64 * 10.0,
                market_cap_gbp: (rows - i) as f64 * 8.0,
                market_cap_eur: (rows - i) as f64 * 9.0,
                market_cap_inr: (rows - i) as f64 * 830.0,
            })
            .collect();
        save_table(&dataset, &mut conn, "Largest_banks").unwrap();
        conn
    }

    #[test]
    fn limit_query_returns_top_rows_in_rank_order() {
        let conn = loaded_conn(10);
        let rows = run("SELECT Name FROM Largest_banks LIMIT 5", &conn).unwrap();
        assert_eq!(rows.len(), 5);
        let names: Vec<String> = rows
            .iter()
            .map(|r| match &r[0] {
                Value::Text(s) => s.clone(),
                other => panic!("expected text, got {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["Bank 1", "Bank 2", "Bank 3", "Bank 4", "Bank 5"]);
    }

    #[test]
    fn aggregate_query_returns_single_tuple() {
        let conn = loaded_conn(2);
        let rows = run("SELECT AVG(MC_GBP_Billion) FROM Largest_banks", &conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], Value::Real(12.0));
    }

    #[test]
    fn bad_sql_is_a_query_execution_error() {
        let conn = loaded_conn(1);
        let err = run("SELECT nope FROM missing_table", &conn).unwrap_err();
        match err {
            EtlError::QueryExecutionError { sql, .. } => {
                assert_eq!(sql, "SELECT nope FROM missing_table");
            }
            other => panic!("expected QueryExecutionError, got {other}"),
        }
    }

    #[test]
    fn row_tuples_format_like_tuples() {
        let tuple = vec![
            Value::Text("JPMorgan Chase".to_string()),
            Value::Real(432.92),
            Value::Null,
        ];
        assert_eq!(format_row(&tuple), "(JPMorgan Chase, 432.92, NULL)");
    }
}

use crate::error::{EtlError, Result};
use crate::extract::TableSelector;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub rates: RatesConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub url: String,
    /// Zero-based position of the ranking table in the document. The ranking
    /// is the 2nd table on the source page, a contract with the page itself.
    #[serde(default = "default_table_index")]
    pub table_index: usize,
    /// When set, select the first table whose header contains this text
    /// instead of selecting by position.
    #[serde(default)]
    pub table_header_match: Option<String>,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_market_cap_column")]
    pub market_cap_column: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_progress_log")]
    pub progress_log: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ReportConfig {
    /// Read-only SQL run against the loaded table at the end of the pipeline.
    #[serde(default)]
    pub queries: Vec<String>,
}

fn default_table_index() -> usize {
    1
}

fn default_name_column() -> String {
    "Bank name".to_string()
}

fn default_market_cap_column() -> String {
    "Market cap (US$ billion)".to_string()
}

fn default_table_name() -> String {
    "Largest_banks".to_string()
}

fn default_progress_log() -> PathBuf {
    PathBuf::from("code_log.txt")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn table_selector(&self) -> TableSelector {
        match &self.source.table_header_match {
            Some(pattern) => TableSelector::HeaderContains(pattern.clone()),
            None => TableSelector::Index(self.source.table_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let toml_src = r#"
            [source]
            url = "https://example.com/banks"

            [rates]
            path = "exchange_rate.csv"

            [output]
            csv_path = "out.csv"
            db_path = "Banks.db"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert_eq!(config.source.table_index, 1);
        assert_eq!(config.source.name_column, "Bank name");
        assert_eq!(config.output.table_name, "Largest_banks");
        assert!(config.report.queries.is_empty());
        assert!(matches!(config.table_selector(), TableSelector::Index(1)));
    }

    #[test]
    fn header_match_overrides_index_selection() {
        let toml_src = r#"
            [source]
            url = "https://example.com/banks"
            table_header_match = "Market cap"

            [rates]
            path = "exchange_rate.csv"

            [output]
            csv_path = "out.csv"
            db_path = "Banks.db"
        "#;
        let config: Config = toml::from_str(toml_src).unwrap();
        assert!(matches!(
            config.table_selector(),
            TableSelector::HeaderContains(p) if p == "Market cap"
        ));
    }
}

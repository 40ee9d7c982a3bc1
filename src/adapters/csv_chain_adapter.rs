//! CSV file chain adapter.
//!
//! Backs the chain port with per-root CSV files for backtest runs. Each row
//! is one listed contract on one session:
//! `date,underlying_price,expiry,strike,right,weekly`. Malformed rows are
//! rejected here so the filter logic only ever sees well-formed contracts.

use crate::domain::chain::ChainSnapshot;
use crate::domain::error::OptpipeError;
use crate::domain::symbol::{OptionRight, Symbol};
use crate::ports::chain_port::ChainPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvChainAdapter {
    base_path: PathBuf,
}

impl CsvChainAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, root: &Symbol) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", root.root, root.market))
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    source_name: &str,
) -> Result<&'a str, OptpipeError> {
    record.get(index).ok_or_else(|| OptpipeError::ChainFormat {
        source_name: source_name.to_string(),
        reason: format!("missing {} column", name),
    })
}

impl ChainPort for CsvChainAdapter {
    fn chain_snapshot(
        &self,
        root: &Symbol,
        session: NaiveDate,
    ) -> Result<ChainSnapshot, OptpipeError> {
        let path = self.csv_path(root);
        let source_name = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| OptpipeError::Chain {
            root: root.id().to_string(),
            reason: format!("failed to read {}: {}", source_name, e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut underlying_price = None;
        let mut contracts = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| OptpipeError::ChainFormat {
                source_name: source_name.clone(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date", &source_name)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid date value: {}", e),
                }
            })?;

            if date != session {
                continue;
            }

            let price: f64 = field(&record, 1, "underlying_price", &source_name)?
                .parse()
                .map_err(|e| OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid underlying_price value: {}", e),
                })?;

            let expiry_str = field(&record, 2, "expiry", &source_name)?;
            let expiry = NaiveDate::parse_from_str(expiry_str, "%Y-%m-%d").map_err(|e| {
                OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid expiry value: {}", e),
                }
            })?;

            let strike: f64 = field(&record, 3, "strike", &source_name)?
                .parse()
                .map_err(|e| OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid strike value: {}", e),
                })?;

            let right_str = field(&record, 4, "right", &source_name)?;
            let right =
                OptionRight::parse(right_str).ok_or_else(|| OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid right value: {}", right_str),
                })?;

            let weekly_str = field(&record, 5, "weekly", &source_name)?;
            let weekly =
                Self::parse_bool(weekly_str).ok_or_else(|| OptpipeError::ChainFormat {
                    source_name: source_name.clone(),
                    reason: format!("invalid weekly value: {}", weekly_str),
                })?;

            underlying_price.get_or_insert(price);
            contracts.push(Symbol::option_contract(
                &root.root,
                &root.market,
                right,
                strike,
                expiry,
                weekly,
            ));
        }

        match underlying_price {
            Some(price) => Ok(ChainSnapshot {
                underlying_price: price,
                contracts,
            }),
            // nothing listed for this session: a valid degenerate chain
            None => Ok(ChainSnapshot::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,underlying_price,expiry,strike,right,weekly\n\
            2014-06-09,100.25,2014-06-13,95.0,put,true\n\
            2014-06-09,100.25,2014-06-13,100.0,put,true\n\
            2014-06-09,100.25,2014-06-13,100.0,call,true\n\
            2014-06-09,100.25,2014-06-20,100.0,put,false\n\
            2014-06-10,101.50,2014-06-13,100.0,put,true\n";

        fs::write(path.join("XSP_USA.csv"), csv_content).unwrap();
        (dir, path)
    }

    #[test]
    fn snapshot_returns_rows_for_session_only() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("XSP", "USA");

        let snapshot = adapter.chain_snapshot(&root, date(2014, 6, 9)).unwrap();
        assert_eq!(snapshot.contracts.len(), 4);
        assert_relative_eq!(snapshot.underlying_price, 100.25);

        let snapshot = adapter.chain_snapshot(&root, date(2014, 6, 10)).unwrap();
        assert_eq!(snapshot.contracts.len(), 1);
        assert_relative_eq!(snapshot.underlying_price, 101.5);
    }

    #[test]
    fn snapshot_contracts_carry_metadata() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("XSP", "USA");

        let snapshot = adapter.chain_snapshot(&root, date(2014, 6, 9)).unwrap();
        let spec = snapshot.contracts[0].option_spec().unwrap();
        assert_eq!(spec.right, OptionRight::Put);
        assert_relative_eq!(spec.strike, 95.0);
        assert_eq!(spec.expiry, date(2014, 6, 13));
        assert!(spec.weekly);
        assert_eq!(snapshot.contracts[0].root, "XSP");
    }

    #[test]
    fn session_without_rows_is_empty_snapshot() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("XSP", "USA");

        let snapshot = adapter.chain_snapshot(&root, date(2014, 7, 1)).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn missing_file_is_a_chain_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("SPX", "USA");

        let result = adapter.chain_snapshot(&root, date(2014, 6, 9));
        assert!(matches!(result, Err(OptpipeError::Chain { .. })));
    }

    #[test]
    fn malformed_strike_is_rejected_at_the_boundary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("XSP_USA.csv"),
            "date,underlying_price,expiry,strike,right,weekly\n\
             2014-06-09,100.25,2014-06-13,not_a_strike,put,true\n",
        )
        .unwrap();

        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("XSP", "USA");
        let result = adapter.chain_snapshot(&root, date(2014, 6, 9));
        assert!(matches!(result, Err(OptpipeError::ChainFormat { .. })));
    }

    #[test]
    fn unknown_right_is_rejected_at_the_boundary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("XSP_USA.csv"),
            "date,underlying_price,expiry,strike,right,weekly\n\
             2014-06-09,100.25,2014-06-13,100.0,butterfly,true\n",
        )
        .unwrap();

        let adapter = CsvChainAdapter::new(path);
        let root = Symbol::equity("XSP", "USA");
        let result = adapter.chain_snapshot(&root, date(2014, 6, 9));
        assert!(matches!(result, Err(OptpipeError::ChainFormat { .. })));
    }
}

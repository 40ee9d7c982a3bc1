#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use optpipe::domain::chain::ChainSnapshot;
use optpipe::domain::error::OptpipeError;
use optpipe::domain::symbol::{OptionRight, Symbol};
use optpipe::ports::chain_port::ChainPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockChainPort {
    pub snapshots: HashMap<(String, NaiveDate), ChainSnapshot>,
    pub errors: HashMap<String, String>,
    calls: RefCell<usize>,
}

impl MockChainPort {
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(0),
        }
    }

    pub fn with_snapshot(mut self, root: &str, session: NaiveDate, snapshot: ChainSnapshot) -> Self {
        self.snapshots.insert((root.to_string(), session), snapshot);
        self
    }

    pub fn with_error(mut self, root: &str, reason: &str) -> Self {
        self.errors.insert(root.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl ChainPort for MockChainPort {
    fn chain_snapshot(
        &self,
        root: &Symbol,
        session: NaiveDate,
    ) -> Result<ChainSnapshot, OptpipeError> {
        *self.calls.borrow_mut() += 1;

        if let Some(reason) = self.errors.get(&root.root) {
            return Err(OptpipeError::Chain {
                root: root.id().to_string(),
                reason: reason.clone(),
            });
        }

        Ok(self
            .snapshots
            .get(&(root.root.clone(), session))
            .cloned()
            .unwrap_or_else(ChainSnapshot::empty))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
    day.and_hms_opt(h, m, 0).unwrap().and_utc()
}

pub fn put(root: &str, strike: f64, expiry: NaiveDate, weekly: bool) -> Symbol {
    Symbol::option_contract(root, "USA", OptionRight::Put, strike, expiry, weekly)
}

pub fn call(root: &str, strike: f64, expiry: NaiveDate, weekly: bool) -> Symbol {
    Symbol::option_contract(root, "USA", OptionRight::Call, strike, expiry, weekly)
}

pub fn snapshot(underlying_price: f64, contracts: Vec<Symbol>) -> ChainSnapshot {
    ChainSnapshot {
        underlying_price,
        contracts,
    }
}

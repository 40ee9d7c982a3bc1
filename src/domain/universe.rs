//! Universe selection: dated root-symbol schedule and per-session chain
//! filtering.
//!
//! Root selection partitions the timeline: each calendar date (in the
//! exchange's time zone) maps to at most one active root. The filtered
//! contract set is recomputed once per session and cached for intra-session
//! ticks.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use super::chain::{filter_chain, ChainCriteria};
use super::error::OptpipeError;
use super::symbol::Symbol;
use crate::ports::chain_port::ChainPort;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("empty entry in root schedule")]
    EmptyEntry,

    #[error("invalid schedule entry '{0}': expected YYYY-MM-DD:TICKER")]
    InvalidEntry(String),

    #[error("invalid effective date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("duplicate effective date: {0}")]
    DuplicateDate(NaiveDate),

    #[error("root schedule has no entries")]
    Empty,
}

/// Sorted table of (effective-date, root-ticker) pairs.
///
/// The active root for a date is the latest entry whose effective date does
/// not exceed it; dates before the first entry have no active root. Entries
/// are disjoint by construction, so the schedule is a total partition of the
/// timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSchedule {
    entries: Vec<(NaiveDate, String)>,
}

impl RootSchedule {
    pub fn new(mut entries: Vec<(NaiveDate, String)>) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::Empty);
        }
        entries.sort_by_key(|(date, _)| *date);
        for pair in entries.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(ScheduleError::DuplicateDate(pair[0].0));
            }
        }
        Ok(RootSchedule { entries })
    }

    pub fn active_root(&self, date: NaiveDate) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(effective, _)| *effective <= date)
            .map(|(_, root)| root.as_str())
    }
}

/// Parse a `roots` config list: comma-separated `YYYY-MM-DD:TICKER` entries.
pub fn parse_schedule(input: &str) -> Result<RootSchedule, ScheduleError> {
    let mut entries = Vec::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::EmptyEntry);
        }
        let (date_str, root) = trimmed
            .split_once(':')
            .ok_or_else(|| ScheduleError::InvalidEntry(trimmed.to_string()))?;
        let root = root.trim();
        if root.is_empty() {
            return Err(ScheduleError::InvalidEntry(trimmed.to_string()));
        }
        let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
            .map_err(|_| ScheduleError::InvalidDate(date_str.trim().to_string()))?;
        entries.push((date, root.to_uppercase()));
    }

    RootSchedule::new(entries)
}

/// The set of symbols currently eligible for signal generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub session: NaiveDate,
    pub symbols: Vec<Symbol>,
}

/// Selects the universe for each tick: roots by calendar date, contracts by
/// chain filtering at session open.
#[derive(Debug)]
pub struct UniverseSelector {
    schedule: RootSchedule,
    market: String,
    criteria: ChainCriteria,
    utc_offset: FixedOffset,
    cached: Option<Universe>,
}

impl UniverseSelector {
    pub fn new(
        schedule: RootSchedule,
        market: &str,
        criteria: ChainCriteria,
        utc_offset: FixedOffset,
    ) -> Self {
        UniverseSelector {
            schedule,
            market: market.to_string(),
            criteria,
            utc_offset,
            cached: None,
        }
    }

    /// The exchange-local calendar date of a UTC tick.
    pub fn session_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.utc_offset).date_naive()
    }

    /// The root underlying symbols active at `at`: zero or one, by schedule.
    pub fn select_root_symbols(&self, at: DateTime<Utc>) -> Vec<Symbol> {
        let date = self.session_date(at);
        self.schedule
            .active_root(date)
            .map(|root| Symbol::equity(root, &self.market))
            .into_iter()
            .collect()
    }

    /// The universe for the tick's session, recomputed at most once per
    /// session.
    ///
    /// The first call of a new session expands each active root through the
    /// chain provider and filters the chain; later calls in the same session
    /// return the cached set untouched. Provider failure propagates and
    /// leaves the cache as it was.
    pub fn refresh(
        &mut self,
        at: DateTime<Utc>,
        chain: &dyn ChainPort,
    ) -> Result<&Universe, OptpipeError> {
        let session = self.session_date(at);
        if self.cached.as_ref().map(|u| u.session) != Some(session) {
            let mut symbols = Vec::new();
            for root in self.select_root_symbols(at) {
                let snapshot = chain.chain_snapshot(&root, session)?;
                symbols.extend(filter_chain(&self.criteria, session, &snapshot));
            }
            self.cached = Some(Universe { session, symbols });
        }
        Ok(self.cached.get_or_insert_with(|| Universe {
            session,
            symbols: Vec::new(),
        }))
    }

    pub fn cached(&self) -> Option<&Universe> {
        self.cached.as_ref()
    }
}

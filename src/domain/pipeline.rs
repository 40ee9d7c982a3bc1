//! Pipeline composition and tick scheduling.
//!
//! The driver invokes [`Pipeline::on_tick`] once per scheduled tick; data
//! flows universe → insights → targets and nothing else is mutated.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};

use super::alpha::ConstantContractAlpha;
use super::error::OptpipeError;
use super::insight::Insight;
use super::targets::{construct_targets, PortfolioTarget};
use super::universe::UniverseSelector;
use crate::ports::chain_port::ChainPort;

/// Date range and tick cadence for a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub tick_minutes: i64,
}

/// Trading session hours in the exchange's fixed UTC offset.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHours {
    pub utc_offset: FixedOffset,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl SessionHours {
    /// UTC instant of an exchange-local wall-clock time on `date`.
    pub fn tick_utc(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        let naive_utc = local - Duration::seconds(i64::from(self.utc_offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(naive_utc, Utc)
    }

    /// Scheduled tick instants for one session, open to close inclusive.
    pub fn session_ticks(&self, date: NaiveDate, tick_minutes: i64) -> Vec<DateTime<Utc>> {
        let mut ticks = Vec::new();
        let mut time = self.open;
        while time <= self.close {
            ticks.push(self.tick_utc(date, time));
            let (next, wrapped) =
                time.overflowing_add_signed(Duration::minutes(tick_minutes.max(1)));
            if wrapped != 0 {
                break;
            }
            time = next;
        }
        ticks
    }

    pub fn is_trading_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Output of one scheduling tick: plain data, no external effects.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    pub universe_size: usize,
    pub insights: Vec<Insight>,
    pub targets: Vec<PortfolioTarget>,
}

/// The three-stage strategy pipeline: universe selection, signal
/// generation, target construction.
pub struct Pipeline {
    selector: UniverseSelector,
    alpha: ConstantContractAlpha,
}

impl Pipeline {
    pub fn new(selector: UniverseSelector, alpha: ConstantContractAlpha) -> Self {
        Pipeline { selector, alpha }
    }

    /// Run one tick: refresh the universe (cached within a session),
    /// generate insights for eligible symbols, construct their targets.
    ///
    /// Chain-provider failure aborts the tick with no partial effects.
    pub fn on_tick(
        &mut self,
        at: DateTime<Utc>,
        chain: &dyn ChainPort,
    ) -> Result<TickReport, OptpipeError> {
        let universe = self.selector.refresh(at, chain)?;
        let insights = self.alpha.generate(at, universe);
        let targets = construct_targets(&insights);
        Ok(TickReport {
            at,
            universe_size: universe.symbols.len(),
            insights,
            targets,
        })
    }

    pub fn selector(&self) -> &UniverseSelector {
        &self.selector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn sample_hours() -> SessionHours {
        SessionHours {
            utc_offset: FixedOffset::west_opt(5 * 3600).unwrap(),
            open: time(9, 30),
            close: time(16, 0),
        }
    }

    #[test]
    fn tick_utc_applies_offset() {
        let hours = sample_hours();
        let at = hours.tick_utc(date(2024, 6, 17), time(9, 30));
        // 09:30 UTC-5 is 14:30 UTC
        assert_eq!(
            at,
            date(2024, 6, 17).and_hms_opt(14, 30, 0).unwrap().and_utc()
        );
    }

    #[test]
    fn session_ticks_cover_open_to_close() {
        let hours = sample_hours();
        let ticks = hours.session_ticks(date(2024, 6, 17), 30);
        // 09:30..=16:00 every 30 minutes
        assert_eq!(ticks.len(), 14);
        assert_eq!(ticks[0], hours.tick_utc(date(2024, 6, 17), time(9, 30)));
        assert_eq!(
            ticks[ticks.len() - 1],
            hours.tick_utc(date(2024, 6, 17), time(16, 0))
        );
    }

    #[test]
    fn session_ticks_are_strictly_increasing() {
        let ticks = sample_hours().session_ticks(date(2024, 6, 17), 45);
        for pair in ticks.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn weekends_are_not_trading_days() {
        assert!(SessionHours::is_trading_day(date(2024, 6, 17))); // Monday
        assert!(SessionHours::is_trading_day(date(2024, 6, 21))); // Friday
        assert!(!SessionHours::is_trading_day(date(2024, 6, 22))); // Saturday
        assert!(!SessionHours::is_trading_day(date(2024, 6, 23))); // Sunday
    }
}

//! Option chain snapshots and contract filtering.
//!
//! A snapshot is the full listed chain for one root at one session, together
//! with the underlying's current price. Filtering applies four independent
//! predicates (strike window, expiration window, cycle, right); they commute,
//! so a surviving contract satisfies all of them simultaneously.

use chrono::NaiveDate;

use super::symbol::{OptionRight, SecurityKind, Symbol};

/// The full contract chain for one root symbol at one session.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub underlying_price: f64,
    pub contracts: Vec<Symbol>,
}

impl ChainSnapshot {
    pub fn empty() -> Self {
        ChainSnapshot {
            underlying_price: 0.0,
            contracts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

/// Declarative contract filter criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainCriteria {
    /// Strike ranks kept on each side of the at-the-money strike.
    /// 0 keeps the ATM strike only.
    pub strike_span: usize,
    /// Minimum days from the session date to expiration, inclusive.
    pub min_expiry_days: i64,
    /// Maximum days from the session date to expiration, inclusive.
    pub max_expiry_days: i64,
    /// Keep only weekly-cycle contracts.
    pub weeklys_only: bool,
    /// Keep only this right; `None` keeps both.
    pub right: Option<OptionRight>,
}

impl Default for ChainCriteria {
    fn default() -> Self {
        ChainCriteria {
            strike_span: 0,
            min_expiry_days: 0,
            max_expiry_days: 7,
            weeklys_only: true,
            right: Some(OptionRight::Put),
        }
    }
}

/// Apply all filter criteria to a chain snapshot.
///
/// Output preserves chain order and is always a subset of the input. An
/// empty result is a valid degenerate state, not an error. The allowed
/// strike set is computed from the full snapshot, so the predicates stay
/// independent of application order.
pub fn filter_chain(
    criteria: &ChainCriteria,
    session: NaiveDate,
    snapshot: &ChainSnapshot,
) -> Vec<Symbol> {
    let allowed_strikes = strike_window(snapshot, criteria.strike_span);

    snapshot
        .contracts
        .iter()
        .filter(|symbol| {
            let spec = match &symbol.security {
                SecurityKind::Option(spec) => spec,
                SecurityKind::Equity => return false,
            };

            let days_out = (spec.expiry - session).num_days();

            allowed_strikes.iter().any(|&s| s == spec.strike)
                && days_out >= criteria.min_expiry_days
                && days_out <= criteria.max_expiry_days
                && (!criteria.weeklys_only || spec.weekly)
                && criteria.right.map_or(true, |r| spec.right == r)
        })
        .cloned()
        .collect()
}

/// The strikes within `span` ranks of the at-the-money strike.
///
/// ATM is the distinct chain strike nearest the underlying price; on an
/// exact tie the lower strike wins.
fn strike_window(snapshot: &ChainSnapshot, span: usize) -> Vec<f64> {
    let mut strikes: Vec<f64> = snapshot
        .contracts
        .iter()
        .filter_map(|s| s.option_spec())
        .map(|spec| spec.strike)
        .collect();
    strikes.sort_by(|a, b| a.total_cmp(b));
    strikes.dedup();

    if strikes.is_empty() {
        return strikes;
    }

    let mut atm = 0;
    for (i, strike) in strikes.iter().enumerate() {
        if (strike - snapshot.underlying_price).abs()
            < (strikes[atm] - snapshot.underlying_price).abs()
        {
            atm = i;
        }
    }

    let low = atm.saturating_sub(span);
    let high = (atm + span).min(strikes.len() - 1);
    strikes[low..=high].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 17).unwrap()
    }

    fn contract(right: OptionRight, strike: f64, days_out: i64, weekly: bool) -> Symbol {
        Symbol::option_contract(
            "XSP",
            "USA",
            right,
            strike,
            session() + chrono::Duration::days(days_out),
            weekly,
        )
    }

    fn sample_snapshot() -> ChainSnapshot {
        ChainSnapshot {
            underlying_price: 100.0,
            contracts: vec![
                contract(OptionRight::Put, 95.0, 3, true),
                contract(OptionRight::Put, 100.0, 3, true),
                contract(OptionRight::Put, 105.0, 3, true),
                contract(OptionRight::Put, 100.0, 10, true),
                contract(OptionRight::Call, 100.0, 3, true),
                contract(OptionRight::Put, 100.0, 3, false),
            ],
        }
    }

    #[test]
    fn keeps_only_the_atm_weekly_put_in_window() {
        let kept = filter_chain(&ChainCriteria::default(), session(), &sample_snapshot());
        assert_eq!(kept.len(), 1);
        let spec = kept[0].option_spec().unwrap();
        assert_eq!(spec.right, OptionRight::Put);
        assert!((spec.strike - 100.0).abs() < f64::EPSILON);
        assert_eq!(spec.expiry, session() + chrono::Duration::days(3));
        assert!(spec.weekly);
    }

    #[test]
    fn excludes_expiry_outside_window() {
        let kept = filter_chain(&ChainCriteria::default(), session(), &sample_snapshot());
        assert!(kept
            .iter()
            .all(|s| s.option_spec().unwrap().expiry <= session() + chrono::Duration::days(7)));
    }

    #[test]
    fn excludes_calls_when_put_only() {
        let kept = filter_chain(&ChainCriteria::default(), session(), &sample_snapshot());
        assert!(kept
            .iter()
            .all(|s| s.option_spec().unwrap().right == OptionRight::Put));
    }

    #[test]
    fn excludes_monthly_cycle_when_weeklys_only() {
        let kept = filter_chain(&ChainCriteria::default(), session(), &sample_snapshot());
        assert!(kept.iter().all(|s| s.option_spec().unwrap().weekly));
    }

    #[test]
    fn output_is_subset_of_input() {
        let snapshot = sample_snapshot();
        let kept = filter_chain(&ChainCriteria::default(), session(), &snapshot);
        assert!(kept.iter().all(|s| snapshot.contracts.contains(s)));
    }

    #[test]
    fn wider_strike_span_keeps_neighbours() {
        let criteria = ChainCriteria {
            strike_span: 1,
            ..ChainCriteria::default()
        };
        let kept = filter_chain(&criteria, session(), &sample_snapshot());
        let mut strikes: Vec<f64> = kept
            .iter()
            .map(|s| s.option_spec().unwrap().strike)
            .collect();
        strikes.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(strikes, vec![95.0, 100.0, 105.0]);
    }

    #[test]
    fn atm_tie_prefers_lower_strike() {
        let snapshot = ChainSnapshot {
            underlying_price: 100.0,
            contracts: vec![
                contract(OptionRight::Put, 97.5, 3, true),
                contract(OptionRight::Put, 102.5, 3, true),
            ],
        };
        let kept = filter_chain(&ChainCriteria::default(), session(), &snapshot);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].option_spec().unwrap().strike - 97.5).abs() < f64::EPSILON);
    }

    #[test]
    fn both_rights_kept_when_unconstrained() {
        let criteria = ChainCriteria {
            right: None,
            ..ChainCriteria::default()
        };
        let kept = filter_chain(&criteria, session(), &sample_snapshot());
        assert!(kept
            .iter()
            .any(|s| s.option_spec().unwrap().right == OptionRight::Call));
        assert!(kept
            .iter()
            .any(|s| s.option_spec().unwrap().right == OptionRight::Put));
    }

    #[test]
    fn zero_day_expiry_is_within_window() {
        let snapshot = ChainSnapshot {
            underlying_price: 100.0,
            contracts: vec![contract(OptionRight::Put, 100.0, 0, true)],
        };
        let kept = filter_chain(&ChainCriteria::default(), session(), &snapshot);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn already_expired_contract_is_dropped() {
        let snapshot = ChainSnapshot {
            underlying_price: 100.0,
            contracts: vec![contract(OptionRight::Put, 100.0, -1, true)],
        };
        let kept = filter_chain(&ChainCriteria::default(), session(), &snapshot);
        assert!(kept.is_empty());
    }

    #[test]
    fn empty_chain_yields_empty_result() {
        let kept = filter_chain(&ChainCriteria::default(), session(), &ChainSnapshot::empty());
        assert!(kept.is_empty());
    }

    #[test]
    fn equity_rows_never_survive_filtering() {
        let snapshot = ChainSnapshot {
            underlying_price: 100.0,
            contracts: vec![Symbol::equity("XSP", "USA")],
        };
        let kept = filter_chain(&ChainCriteria::default(), session(), &snapshot);
        assert!(kept.is_empty());
    }
}

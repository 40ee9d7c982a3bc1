//! Target construction: insights to desired signed position quantities.

use super::insight::Insight;
use super::symbol::Symbol;

/// Desired signed position quantity for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioTarget {
    pub symbol: Symbol,
    pub quantity: i64,
}

/// One target per insight, in input order: Up maps to +1, Down to -1, Flat
/// to 0.
///
/// Stateless and length-preserving. Multiple insights on one symbol each
/// yield their own target record; netting per-symbol exposure belongs to the
/// consumer applying the targets.
pub fn construct_targets(insights: &[Insight]) -> Vec<PortfolioTarget> {
    insights
        .iter()
        .map(|insight| PortfolioTarget {
            symbol: insight.symbol.clone(),
            quantity: insight.direction.sign(),
        })
        .collect()
}

//! Signal generation: constant directional insights for option contracts.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use super::insight::{Insight, InsightDirection};
use super::symbol::Symbol;
use super::universe::Universe;

/// Fixed direction and validity period for every emitted insight.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaSettings {
    pub direction: InsightDirection,
    pub period: Duration,
}

impl Default for AlphaSettings {
    fn default() -> Self {
        AlphaSettings {
            direction: InsightDirection::Down,
            period: Duration::minutes(30),
        }
    }
}

/// Emits one insight per eligible contract, re-asserting it once the prior
/// insight's validity period has elapsed.
///
/// Eligibility gates on instrument kind first: the underlying equity never
/// receives an insight, only its listed contracts. A symbol without
/// bookkeeping is immediately eligible.
pub struct ConstantContractAlpha {
    settings: AlphaSettings,
    live_until: HashMap<Symbol, DateTime<Utc>>,
}

impl ConstantContractAlpha {
    pub fn new(settings: AlphaSettings) -> Self {
        ConstantContractAlpha {
            settings,
            live_until: HashMap::new(),
        }
    }

    pub fn should_emit(&self, at: DateTime<Utc>, symbol: &Symbol) -> bool {
        if !symbol.is_option() {
            return false;
        }
        match self.live_until.get(symbol) {
            None => true,
            Some(&until) => at >= until,
        }
    }

    /// One insight per eligible universe symbol, in universe order.
    pub fn generate(&mut self, at: DateTime<Utc>, universe: &Universe) -> Vec<Insight> {
        // drop bookkeeping for symbols no longer selected
        self.live_until
            .retain(|symbol, _| universe.symbols.contains(symbol));

        let mut insights = Vec::new();
        for symbol in &universe.symbols {
            if !self.should_emit(at, symbol) {
                continue;
            }
            let insight = Insight::price(
                symbol.clone(),
                at,
                self.settings.period,
                self.settings.direction,
            );
            self.live_until.insert(symbol.clone(), insight.expires_at());
            insights.push(insight);
        }
        insights
    }
}

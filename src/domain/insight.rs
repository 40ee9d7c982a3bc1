//! Directional trading signals with a validity period.
//!
//! The pipeline only emits insights; closing and scoring them once the
//! validity period elapses belongs to the analysis subsystem downstream.

use chrono::{DateTime, Duration, Utc};

use super::symbol::Symbol;

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsightDirection {
    Up,
    Down,
    Flat,
}

impl InsightDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "up" => Some(InsightDirection::Up),
            "down" => Some(InsightDirection::Down),
            "flat" => Some(InsightDirection::Flat),
            _ => None,
        }
    }

    /// Signed unit quantity for this direction.
    pub fn sign(self) -> i64 {
        match self {
            InsightDirection::Up => 1,
            InsightDirection::Down => -1,
            InsightDirection::Flat => 0,
        }
    }
}

/// What the signal predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Price,
    Volatility,
}

/// A time-stamped directional signal over one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub symbol: Symbol,
    pub emitted_at: DateTime<Utc>,
    pub direction: InsightDirection,
    pub period: Duration,
    pub kind: InsightKind,
}

impl Insight {
    /// A price-direction insight.
    pub fn price(
        symbol: Symbol,
        emitted_at: DateTime<Utc>,
        period: Duration,
        direction: InsightDirection,
    ) -> Self {
        Insight {
            symbol,
            emitted_at,
            direction,
            period,
            kind: InsightKind::Price,
        }
    }

    /// When the validity period elapses.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.emitted_at + self.period
    }

    /// Still pending at `at`.
    pub fn is_open(&self, at: DateTime<Utc>) -> bool {
        at < self.expires_at()
    }
}

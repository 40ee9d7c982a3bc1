//! Instrument identification: underlying equities and option contracts.

use chrono::NaiveDate;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Side of an option contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionRight {
    Call,
    Put,
}

impl OptionRight {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "call" | "c" => Some(OptionRight::Call),
            "put" | "p" => Some(OptionRight::Put),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            OptionRight::Call => 'C',
            OptionRight::Put => 'P',
        }
    }
}

/// Contract metadata carried by option symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub right: OptionRight,
    pub strike: f64,
    pub expiry: NaiveDate,
    /// Weekly expiration cycle, as opposed to the standard monthly cycle.
    pub weekly: bool,
}

/// Instrument kind: the underlying itself, or one of its listed contracts.
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityKind {
    Equity,
    Option(OptionSpec),
}

/// A tradable instrument, immutable once created.
///
/// `root` is the underlying ticker; for option contracts it is the link back
/// to the underlying symbol. The canonical `id` is derived from the
/// identifying fields, so two symbols are equal iff those fields match.
#[derive(Debug, Clone)]
pub struct Symbol {
    id: String,
    pub root: String,
    pub market: String,
    pub security: SecurityKind,
}

impl Symbol {
    pub fn equity(root: &str, market: &str) -> Self {
        Symbol {
            id: format!("{}.{}", root, market),
            root: root.to_string(),
            market: market.to_string(),
            security: SecurityKind::Equity,
        }
    }

    pub fn option_contract(
        root: &str,
        market: &str,
        right: OptionRight,
        strike: f64,
        expiry: NaiveDate,
        weekly: bool,
    ) -> Self {
        Symbol {
            id: format!(
                "{}.{} {} {}{:.3}",
                root,
                market,
                expiry.format("%Y-%m-%d"),
                right.code(),
                strike
            ),
            root: root.to_string(),
            market: market.to_string(),
            security: SecurityKind::Option(OptionSpec {
                right,
                strike,
                expiry,
                weekly,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_option(&self) -> bool {
        matches!(self.security, SecurityKind::Option(_))
    }

    pub fn option_spec(&self) -> Option<&OptionSpec> {
        match &self.security {
            SecurityKind::Option(spec) => Some(spec),
            SecurityKind::Equity => None,
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

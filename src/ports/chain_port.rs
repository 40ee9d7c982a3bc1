//! Option chain retrieval port trait.

use crate::domain::chain::ChainSnapshot;
use crate::domain::error::OptpipeError;
use crate::domain::symbol::Symbol;
use chrono::NaiveDate;

/// Synchronous, side-effect-free chain query.
///
/// A session with nothing listed is an empty snapshot; unavailability is an
/// error the caller must propagate, never paper over with stale data.
pub trait ChainPort {
    fn chain_snapshot(
        &self,
        root: &Symbol,
        session: NaiveDate,
    ) -> Result<ChainSnapshot, OptpipeError>;
}

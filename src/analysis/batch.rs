//! Parallel analysis over many compilation units.
//!
//! Units are independent (trees are immutable and the analysis keeps no
//! cross-unit state), so a batch is embarrassingly parallel. Results come
//! back in input order regardless of scheduling.

use rayon::prelude::*;
use tracing::debug;

use crate::analysis::close_resource::{analyze_unit, Finding};
use crate::analysis::policy::ClosePolicy;
use crate::tree::model::Tree;

/// Analyze each compilation unit on the rayon pool. `results[i]` holds the
/// findings for `units[i]`.
#[must_use]
pub fn analyze_units(units: &[Tree], policy: &ClosePolicy) -> Vec<Vec<Finding>> {
    debug!(units = units.len(), "starting batch analysis");
    units
        .par_iter()
        .map(|unit| analyze_unit(unit, policy))
        .collect()
}

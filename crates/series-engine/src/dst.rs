//! DST transition policies for wall-clock resolution.

use serde::{Deserialize, Serialize};

/// Policy for resolving an ambiguous local *end* time during a fall-back
/// overlap.
///
/// Start times always take the earlier (pre-transition) offset, and times
/// inside a spring-forward gap always shift later by the size of the gap.
/// The overlap case for end instants has no single correct answer, so it is
/// configurable per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndDisambiguation {
    /// Prefer the earlier offset unless that would not keep start < end.
    #[default]
    PreserveOrdering,
    /// Always the earlier (pre-transition) offset.
    Earlier,
    /// Always the later (post-transition) offset.
    Later,
}

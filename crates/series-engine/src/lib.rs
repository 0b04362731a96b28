//! # series-engine
//!
//! Deterministic occurrence computation for recurring calendar events.
//!
//! Given a structured recurrence rule, a start anchor in a time zone, and
//! per-instance override/cancellation sets, the engine produces the
//! ordered, bounded sequence of concrete occurrences: stable positions
//! within the original series, deterministic resolution of DST gaps and
//! overlaps, and a calculation limit that keeps open-ended rules from
//! unbounded work.
//!
//! ## Modules
//!
//! - [`rule`] — structured recurrence rules (frequency, interval, termination)
//! - [`localtime`] — wall-clock to instant conversion, anchors and spans
//! - [`dst`] — DST disambiguation policies
//! - [`expander`] — the rule stepper producing original candidates
//! - [`merge`] — exception merging into effective occurrences
//! - [`iter`] — the stateful occurrence iterator and query bounds
//! - [`lookup`] — inverse position/date queries
//! - [`config`] — externally sourced calculation limit
//! - [`error`] — error types

pub mod config;
pub mod dst;
pub mod error;
pub mod expander;
pub mod iter;
pub mod localtime;
pub mod lookup;
pub mod merge;
pub mod rule;

pub use config::CalculationLimit;
pub use dst::EndDisambiguation;
pub use error::SeriesError;
pub use expander::{Candidate, Stepper};
pub use iter::{OccurrenceIter, Query};
pub use localtime::Anchor;
pub use lookup::{date_at, position_of};
pub use merge::{ExceptionSet, Occurrence};
pub use rule::{Frequency, NthWeekday, Rule, Termination};

use error::Result;

/// Expand one query into its bounded occurrence sequence.
///
/// Candidates stream out of the stepper, exceptions merge in lockstep, then
/// the window, result limit and first/last flags apply to the effective
/// (post-override) start instants.
pub fn occurrences(
    anchor: &Anchor,
    rule: &Rule,
    exceptions: &ExceptionSet,
    query: &Query,
    limit: CalculationLimit,
) -> Result<OccurrenceIter> {
    tracing::trace!(?rule, limit = limit.get(), "expanding series");
    let (_, span) = anchor.span(query.end_disambiguation)?;
    let stepper = Stepper::new(anchor, rule, limit)?;
    let mut merger = merge::MergeIter::new(stepper, exceptions, span, query.end_disambiguation);
    let mut merged = Vec::new();
    while let Some(occurrence) = merger.next_occurrence()? {
        merged.push(occurrence);
    }
    Ok(OccurrenceIter::assemble(merged, query))
}

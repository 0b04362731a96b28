//! The stateful occurrence iterator and query bounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dst::EndDisambiguation;
use crate::error::{Result, SeriesError};
use crate::merge::Occurrence;

/// Bounds for one query: an optional half-open window on effective start
/// instants, an optional result-count limit, and the end-time policy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    /// Inclusive lower bound on effective start instants.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on effective start instants.
    pub until: Option<DateTime<Utc>>,
    /// Cap on the number of returned occurrences, applied after the window.
    pub max_results: Option<usize>,
    /// Resolution policy for ambiguous wall-clock end times.
    pub end_disambiguation: EndDisambiguation,
}

impl Query {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Whether an effective start instant falls inside the window. Only the
    /// start is tested, never the occurrence's span: a lower bound landing
    /// mid-span after the start still excludes the occurrence.
    pub(crate) fn contains(&self, start: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| start >= from)
            && self.until.is_none_or(|until| start < until)
    }
}

/// Cursor over the bounded, chronologically ordered occurrence sequence of
/// one query. Not shareable between callers; each query builds its own.
#[derive(Debug, Clone)]
pub struct OccurrenceIter {
    items: Vec<Occurrence>,
    cursor: usize,
    last_position: Option<u32>,
}

impl OccurrenceIter {
    /// Sort, window, limit and flag the merged sequence.
    pub(crate) fn assemble(mut merged: Vec<Occurrence>, query: &Query) -> Self {
        // Overrides may move a slot anywhere in time, so positional order no
        // longer implies chronological order. Ties keep position order.
        merged.sort_by_key(|occ| (occ.start, occ.position));
        merged.retain(|occ| query.contains(occ.start));
        if let Some(max) = query.max_results {
            merged.truncate(max);
        }
        if let Some(first) = merged.first_mut() {
            first.is_first = true;
        }
        if let Some(last) = merged.last_mut() {
            last.is_last = true;
        }
        Self {
            items: merged,
            cursor: 0,
            last_position: None,
        }
    }

    /// Whether another occurrence remains.
    pub fn has_next(&self) -> bool {
        self.cursor < self.items.len()
    }

    /// The next occurrence; [`SeriesError::Exhausted`] once the sequence is
    /// consumed, never a sentinel value.
    pub fn next(&mut self) -> Result<Occurrence> {
        let occurrence = self
            .items
            .get(self.cursor)
            .copied()
            .ok_or(SeriesError::Exhausted)?;
        self.cursor += 1;
        self.last_position = Some(occurrence.position);
        Ok(occurrence)
    }

    /// Original-series position of the most recently returned occurrence.
    pub fn current_position(&self) -> Option<u32> {
        self.last_position
    }

    /// True while the cursor rests on the first element of this query's
    /// bounded output.
    pub fn is_first_occurrence(&self) -> bool {
        self.cursor == 1
    }

    /// True once no element follows the most recently returned one.
    pub fn is_last_occurrence(&self) -> bool {
        self.cursor > 0 && self.cursor >= self.items.len()
    }

    /// Total number of occurrences in this query's output.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

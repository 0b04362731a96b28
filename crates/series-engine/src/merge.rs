//! Exception merging: combines the candidate stream with change and delete
//! exceptions into the effective occurrence sequence.

use std::collections::{btree_map, btree_set, BTreeMap, BTreeSet};
use std::iter::Peekable;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::dst::EndDisambiguation;
use crate::error::Result;
use crate::expander::Stepper;
use crate::localtime::Anchor;

/// Per-instance overrides and cancellations, keyed by recurrence-id (the
/// original, un-overridden start instant of the slot they apply to).
#[derive(Debug, Clone, Default)]
pub struct ExceptionSet {
    changes: BTreeMap<DateTime<Utc>, Anchor>,
    deletes: BTreeSet<DateTime<Utc>>,
}

impl ExceptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot at `recurrence_id` with `replacement`'s start/end.
    /// The slot keeps its original series position.
    pub fn change(&mut self, recurrence_id: DateTime<Utc>, replacement: Anchor) {
        self.changes.insert(recurrence_id, replacement);
    }

    /// Cancel the slot at `recurrence_id`. Its position stays consumed; the
    /// slot just produces no output.
    pub fn delete(&mut self, recurrence_id: DateTime<Utc>) {
        self.deletes.insert(recurrence_id);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletes.is_empty()
    }
}

/// One element of the effective series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Effective start instant (the override's when the slot was changed).
    pub start: DateTime<Utc>,
    /// Effective end instant.
    pub end: DateTime<Utc>,
    /// 1-based position within the original, unmodified series.
    pub position: u32,
    /// Whether this is the first element of the bounded query output.
    pub is_first: bool,
    /// Whether this is the last element of the bounded query output.
    pub is_last: bool,
}

/// Lockstep merge of the ascending candidate stream with the ordered
/// exception sets. Both sets are keyed by recurrence-id, so each advances
/// forward alongside the candidates without repeated lookups.
pub(crate) struct MergeIter<'a> {
    stepper: Stepper<'a>,
    changes: Peekable<btree_map::Iter<'a, DateTime<Utc>, Anchor>>,
    deletes: Peekable<btree_set::Iter<'a, DateTime<Utc>>>,
    span: Duration,
    policy: EndDisambiguation,
}

impl<'a> MergeIter<'a> {
    pub(crate) fn new(
        stepper: Stepper<'a>,
        exceptions: &'a ExceptionSet,
        span: Duration,
        policy: EndDisambiguation,
    ) -> Self {
        Self {
            stepper,
            changes: exceptions.changes.iter().peekable(),
            deletes: exceptions.deletes.iter().peekable(),
            span,
            policy,
        }
    }

    /// The next surviving occurrence, first/last flags left unset.
    pub(crate) fn next_occurrence(&mut self) -> Result<Option<Occurrence>> {
        while let Some(candidate) = self.stepper.next_candidate() {
            while self.deletes.peek().is_some_and(|id| **id < candidate.start) {
                self.deletes.next();
            }
            if self.deletes.peek().is_some_and(|id| **id == candidate.start) {
                self.deletes.next();
                // Cancelled; the position slot stays consumed.
                continue;
            }
            while self
                .changes
                .peek()
                .is_some_and(|(id, _)| **id < candidate.start)
            {
                self.changes.next();
            }
            if let Some((_, replacement)) =
                self.changes.next_if(|(id, _)| **id == candidate.start)
            {
                let (start, span) = replacement.span(self.policy)?;
                return Ok(Some(Occurrence {
                    start,
                    end: start + span,
                    position: candidate.position,
                    is_first: false,
                    is_last: false,
                }));
            }
            return Ok(Some(Occurrence {
                start: candidate.start,
                end: candidate.start + self.span,
                position: candidate.position,
                is_first: false,
                is_last: false,
            }));
        }
        Ok(None)
    }
}

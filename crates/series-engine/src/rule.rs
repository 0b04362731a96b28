//! Structured recurrence rules.
//!
//! Rules arrive already parsed and validated by the caller; this module
//! defines the structured form plus the small amount of defensive
//! validation the engine still performs before stepping.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};

/// A weekday slot within a month. `ordinal` counts from the start of the
/// month when positive and from the end when negative (1 = first such
/// weekday, -1 = last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NthWeekday {
    pub ordinal: i8,
    pub weekday: Weekday,
}

impl NthWeekday {
    pub fn new(ordinal: i8, weekday: Weekday) -> Self {
        Self { ordinal, weekday }
    }
}

/// Recurrence frequency, each kind carrying its own intra-period filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Frequency {
    /// Same calendar date every `interval` years. Years lacking the date
    /// (Feb 29) are skipped.
    Yearly,
    /// Same day-of-month every `interval` months, or the listed
    /// ordinal-weekday slots when `by_day` is non-empty. Months lacking the
    /// day or slot are skipped.
    Monthly { by_day: Vec<NthWeekday> },
    /// The listed weekdays within every `interval`-th week, or just the
    /// anchor's weekday when `by_day` is empty. Weeks start on Monday.
    Weekly { by_day: Vec<Weekday> },
    /// Every `interval` days.
    Daily,
    /// Every `interval` hours.
    Hourly,
    /// Every `interval` minutes.
    Minutely,
}

/// How a series ends: an occurrence count, an end instant, or neither.
///
/// The enum keeps "both COUNT and UNTIL set" unrepresentable, so the
/// ambiguous-termination case never reaches the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Termination {
    /// Stop after exactly this many occurrences.
    Count(u32),
    /// Never emit a candidate whose instant exceeds this.
    Until(DateTime<Utc>),
    /// No intrinsic bound; only the calculation limit applies.
    Unbounded,
}

/// A structured recurrence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub frequency: Frequency,
    /// Positive period step: every `interval`-th day/week/month/...
    pub interval: u32,
    pub termination: Termination,
}

impl Rule {
    pub fn new(frequency: Frequency, interval: u32, termination: Termination) -> Self {
        Self {
            frequency,
            interval,
            termination,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(SeriesError::InvalidRule(
                "interval must be at least 1".into(),
            ));
        }
        if let Frequency::Monthly { by_day } = &self.frequency {
            for slot in by_day {
                if slot.ordinal == 0 || !(-5..=5).contains(&slot.ordinal) {
                    return Err(SeriesError::InvalidRule(format!(
                        "month ordinal {} out of range",
                        slot.ordinal
                    )));
                }
            }
        }
        Ok(())
    }
}

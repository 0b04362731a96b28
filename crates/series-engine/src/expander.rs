//! The rule stepper: lazily expands an anchor and rule into the ordered
//! stream of original candidate instants.
//!
//! Implemented as an explicit state machine rather than a generator so the
//! calculation guard can truncate the stream cleanly mid-flight.

use std::collections::VecDeque;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::config::CalculationLimit;
use crate::error::Result;
use crate::localtime::Anchor;
use crate::rule::{Frequency, NthWeekday, Rule, Termination};

/// One slot of the theoretical, exception-free series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// The original, un-overridden start instant; identifies the slot.
    pub start: DateTime<Utc>,
    /// 1-based position within the original series.
    pub position: u32,
}

/// Lazy, ordered candidate stream for one query.
///
/// Candidates come out in increasing chronological order, one per call to
/// [`Stepper::next_candidate`]. The anchor's own start is always the first
/// candidate, even when it does not satisfy the rule's filters.
#[derive(Debug)]
pub struct Stepper<'a> {
    anchor: &'a Anchor,
    rule: &'a Rule,
    guard: u32,
    /// Candidates emitted so far; doubles as the position counter.
    emitted: u32,
    /// Period advances performed so far, bounded by the guard so that
    /// filter-sparse rules cannot scan unboundedly between emissions.
    advances: u32,
    /// Wall-clock origin of the current period (first of the month for
    /// monthly and yearly frequencies).
    period: NaiveDateTime,
    /// Sub-candidates of the current period not yet emitted, ascending.
    pending: VecDeque<NaiveDateTime>,
    /// Whether the anchor itself has been handed out yet.
    started: bool,
    /// Instant of the last emitted candidate, for strict ordering.
    last_start: Option<DateTime<Utc>>,
    done: bool,
}

impl<'a> Stepper<'a> {
    pub fn new(anchor: &'a Anchor, rule: &'a Rule, limit: CalculationLimit) -> Result<Self> {
        rule.validate()?;
        let period = period_origin(anchor.start, &rule.frequency);
        let mut stepper = Self {
            anchor,
            rule,
            guard: limit.get(),
            emitted: 0,
            advances: 0,
            period,
            pending: VecDeque::new(),
            started: false,
            last_start: None,
            done: false,
        };
        // Sub-candidates of the anchor's own period that fall after the
        // anchor; the anchor itself is always candidate 1 and filtered
        // slots at or before it are never re-emitted.
        let first = stepper.expand_period(stepper.period);
        stepper.pending = first.into_iter().filter(|wall| *wall > anchor.start).collect();
        Ok(stepper)
    }

    /// Produce the next candidate, or `None` once the stream ends.
    pub fn next_candidate(&mut self) -> Option<Candidate> {
        if self.done {
            return None;
        }
        if let Termination::Count(count) = self.rule.termination {
            if self.emitted >= count {
                self.done = true;
                return None;
            }
        }
        if self.emitted >= self.guard {
            tracing::debug!(guard = self.guard, "calculation guard reached, truncating");
            self.done = true;
            return None;
        }
        let start = loop {
            let wall = match self.next_wall() {
                Some(wall) => wall,
                None => {
                    self.done = true;
                    return None;
                }
            };
            let start = self.anchor.resolve(wall);
            // A gap shift can land on the same instant a later wall-clock
            // slot also maps to; drop the duplicate to keep the stream
            // strictly increasing.
            match self.last_start {
                Some(previous) if start <= previous => continue,
                _ => break start,
            }
        };
        if let Termination::Until(until) = self.rule.termination {
            if start > until {
                self.done = true;
                return None;
            }
        }
        self.last_start = Some(start);
        self.emitted += 1;
        Some(Candidate {
            start,
            position: self.emitted,
        })
    }

    /// The next wall-clock start, advancing periods as needed.
    fn next_wall(&mut self) -> Option<NaiveDateTime> {
        if !self.started {
            self.started = true;
            return Some(self.anchor.start);
        }
        loop {
            if let Some(wall) = self.pending.pop_front() {
                return Some(wall);
            }
            if self.advances >= self.guard {
                tracing::debug!(guard = self.guard, "calculation guard reached scanning periods");
                return None;
            }
            self.advances += 1;
            self.period = self.advance(self.period)?;
            let expanded = self.expand_period(self.period);
            let anchor_start = self.anchor.start;
            self.pending = expanded.into_iter().filter(|wall| *wall > anchor_start).collect();
        }
    }

    /// Step the period origin forward by `interval` periods.
    fn advance(&self, period: NaiveDateTime) -> Option<NaiveDateTime> {
        let step = i64::from(self.rule.interval);
        match self.rule.frequency {
            Frequency::Yearly => add_months(period, step.checked_mul(12)?),
            Frequency::Monthly { .. } => add_months(period, step),
            Frequency::Weekly { .. } => period.checked_add_signed(Duration::weeks(step)),
            Frequency::Daily => period.checked_add_signed(Duration::days(step)),
            Frequency::Hourly => period.checked_add_signed(Duration::hours(step)),
            Frequency::Minutely => period.checked_add_signed(Duration::minutes(step)),
        }
    }

    /// All wall-clock sub-candidates within the given period, ascending.
    /// Empty when the period has no matching calendar slot.
    fn expand_period(&self, period: NaiveDateTime) -> Vec<NaiveDateTime> {
        let time = self.anchor.start.time();
        match &self.rule.frequency {
            Frequency::Yearly => {
                month_day(period, self.anchor.start.day(), time).into_iter().collect()
            }
            Frequency::Monthly { by_day } => {
                if by_day.is_empty() {
                    month_day(period, self.anchor.start.day(), time).into_iter().collect()
                } else {
                    let mut days: Vec<NaiveDate> = by_day
                        .iter()
                        .filter_map(|slot| nth_weekday_of_month(period.date(), *slot))
                        .collect();
                    days.sort_unstable();
                    days.dedup();
                    days.into_iter().map(|day| day.and_time(time)).collect()
                }
            }
            Frequency::Weekly { by_day } => {
                if by_day.is_empty() {
                    vec![period]
                } else {
                    let monday = week_start(period.date());
                    let mut offsets: Vec<i64> = by_day
                        .iter()
                        .map(|weekday| i64::from(weekday.num_days_from_monday()))
                        .collect();
                    offsets.sort_unstable();
                    offsets.dedup();
                    offsets
                        .into_iter()
                        .filter_map(|offset| monday.checked_add_signed(Duration::days(offset)))
                        .map(|day| day.and_time(time))
                        .collect()
                }
            }
            Frequency::Daily | Frequency::Hourly | Frequency::Minutely => vec![period],
        }
    }
}

/// Where period stepping is anchored for the given frequency. Monthly and
/// yearly rules step on the first of the month so that months lacking the
/// anchor's day-of-month stay representable.
fn period_origin(anchor: NaiveDateTime, frequency: &Frequency) -> NaiveDateTime {
    match frequency {
        Frequency::Yearly | Frequency::Monthly { .. } => match anchor.date().with_day(1) {
            Some(first) => first.and_time(anchor.time()),
            None => anchor,
        },
        _ => anchor,
    }
}

/// The given day-of-month in the period's month, when the month has it.
fn month_day(period: NaiveDateTime, day: u32, time: NaiveTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(period.year(), period.month(), day).map(|date| date.and_time(time))
}

/// Monday of the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The `slot.ordinal`-th `slot.weekday` of the month containing `date`,
/// counting from the end when negative. `None` when the month has no such
/// slot.
fn nth_weekday_of_month(date: NaiveDate, slot: NthWeekday) -> Option<NaiveDate> {
    let year = date.year();
    let month = date.month();
    if slot.ordinal > 0 {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let offset = (7 + i64::from(slot.weekday.num_days_from_monday())
            - i64::from(first.weekday().num_days_from_monday()))
            % 7;
        let day = first
            .checked_add_signed(Duration::days(offset + 7 * (i64::from(slot.ordinal) - 1)))?;
        (day.month() == month).then_some(day)
    } else {
        let last = last_day_of_month(year, month)?;
        let back = (7 + i64::from(last.weekday().num_days_from_monday())
            - i64::from(slot.weekday.num_days_from_monday()))
            % 7;
        let day = last
            .checked_sub_signed(Duration::days(back + 7 * (i64::from(-slot.ordinal) - 1)))?;
        (day.month() == month).then_some(day)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.checked_sub_signed(Duration::days(1))
}

/// Step a first-of-month wall clock forward by whole months. Day 1 never
/// clamps, so the arithmetic is lossless.
fn add_months(period: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let months = u32::try_from(months).ok()?;
    period.checked_add_months(chrono::Months::new(months))
}

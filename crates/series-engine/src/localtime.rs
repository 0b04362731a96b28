//! Wall-clock to instant conversion for a given time zone.
//!
//! Local civil time is not a bijection with absolute instants across DST
//! transitions, so two cases need a deterministic answer:
//!
//! - a nonexistent local time (spring-forward gap) is reinterpreted with the
//!   pre-transition offset, which reads as the wall clock moving later by
//!   the size of the gap (02:15 becomes 03:15 for a one-hour jump);
//! - an ambiguous local time (fall-back overlap) takes the earlier of the
//!   two possible offsets for start instants, and a configurable policy for
//!   end instants.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::EndDisambiguation;
use crate::error::{Result, SeriesError};

/// The master occurrence of a series: wall-clock start/end, time zone and an
/// all-day flag. Also the shape of a change exception's override payload.
///
/// All-day anchors use the fixed UTC-midnight convention: their wall-clock
/// values are whole UTC calendar days and never pass through zone
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Wall-clock start in `tz` (a UTC calendar day for all-day anchors).
    pub start: NaiveDateTime,
    /// Wall-clock end in `tz`.
    pub end: NaiveDateTime,
    /// The zone the wall-clock fields are written in.
    pub tz: Tz,
    /// Whole-day occurrence, exempt from zone resolution.
    pub all_day: bool,
}

impl Anchor {
    /// A timed anchor in the given zone.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, tz: Tz) -> Self {
        Self {
            start,
            end,
            tz,
            all_day: false,
        }
    }

    /// An all-day anchor spanning whole UTC calendar days.
    pub fn all_day(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
            tz: Tz::UTC,
            all_day: true,
        }
    }

    /// Resolve a wall-clock start written in this anchor's zone.
    pub(crate) fn resolve(&self, wall: NaiveDateTime) -> DateTime<Utc> {
        if self.all_day {
            Utc.from_utc_datetime(&wall)
        } else {
            resolve_start(self.tz, wall)
        }
    }

    /// The anchor's own resolved start and span. The span is re-applied to
    /// every occurrence's resolved start, which is what yields the
    /// hour-longer or hour-shorter wall-clock reading exactly at a
    /// transition and the nominal duration everywhere else.
    pub(crate) fn span(&self, policy: EndDisambiguation) -> Result<(DateTime<Utc>, Duration)> {
        let start = self.resolve(self.start);
        let end = if self.all_day {
            Utc.from_utc_datetime(&self.end)
        } else {
            resolve_end(self.tz, self.end, start, policy)
        };
        if end < start {
            return Err(SeriesError::InvalidAnchor(format!(
                "end {end} precedes start {start}"
            )));
        }
        Ok((start, end - start))
    }
}

/// Resolve a wall-clock start time: earlier offset on a fall-back overlap,
/// forward shift on a spring-forward gap.
pub fn resolve_start(tz: Tz, wall: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => resolve_gap(tz, wall),
    }
}

/// Resolve a wall-clock end time against an already-resolved start instant.
pub fn resolve_end(
    tz: Tz,
    wall: NaiveDateTime,
    start: DateTime<Utc>,
    policy: EndDisambiguation,
) -> DateTime<Utc> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, latest) => {
            let earliest = earliest.with_timezone(&Utc);
            let latest = latest.with_timezone(&Utc);
            match policy {
                EndDisambiguation::Earlier => earliest,
                EndDisambiguation::Later => latest,
                EndDisambiguation::PreserveOrdering => {
                    if earliest > start {
                        earliest
                    } else {
                        latest
                    }
                }
            }
        }
        LocalResult::None => resolve_gap(tz, wall),
    }
}

/// A local time inside a spring-forward gap: reinterpret it with the
/// pre-transition offset. The resulting instant lands past the transition,
/// so the zone renders it later on the wall clock by the size of the gap.
fn resolve_gap(tz: Tz, wall: NaiveDateTime) -> DateTime<Utc> {
    // Probe the zone offset near the transition from both sides; the smaller
    // of the two is the pre-transition offset.
    let direct = tz.offset_from_utc_datetime(&wall).fix().local_minus_utc();
    let stepped = tz
        .offset_from_utc_datetime(&(wall - Duration::seconds(i64::from(direct))))
        .fix()
        .local_minus_utc();
    let pre = direct.min(stepped);
    Utc.from_utc_datetime(&(wall - Duration::seconds(i64::from(pre))))
}

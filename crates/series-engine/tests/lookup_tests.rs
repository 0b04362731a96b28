//! Tests for the inverse position/date queries over the exception-free
//! series.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use series_engine::{
    date_at, position_of, Anchor, CalculationLimit, Frequency, Rule, Termination,
};

fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn limit() -> CalculationLimit {
    CalculationLimit::default()
}

#[test]
fn date_at_returns_the_nth_original_instant() {
    let anchor = Anchor::new(wall(2008, 10, 1, 14, 45), wall(2008, 10, 1, 15, 45), chrono_tz::Europe::Berlin);
    let rule = Rule::new(Frequency::Daily, 1, Termination::Count(5));

    assert_eq!(
        date_at(&anchor, &rule, 3, limit()).unwrap(),
        Some(utc(2008, 10, 3, 12, 45))
    );
}

#[test]
fn date_at_out_of_range_is_none() {
    let anchor = Anchor::new(wall(2026, 3, 1, 9, 0), wall(2026, 3, 1, 10, 0), Tz::UTC);
    let rule = Rule::new(Frequency::Daily, 1, Termination::Count(5));

    assert_eq!(date_at(&anchor, &rule, 0, limit()).unwrap(), None);
    assert_eq!(date_at(&anchor, &rule, 6, limit()).unwrap(), None);
}

#[test]
fn position_of_finds_exact_candidates_only() {
    // Mon/Wed/Fri weekly series anchored Monday 2026-03-02.
    let anchor = Anchor::new(wall(2026, 3, 2, 10, 0), wall(2026, 3, 2, 11, 0), Tz::UTC);
    let rule = Rule::new(
        Frequency::Weekly {
            by_day: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
        },
        1,
        Termination::Count(6),
    );

    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 9, 10, 0), limit()).unwrap(),
        Some(4)
    );
    // A Thursday is not part of the series.
    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 5, 10, 0), limit()).unwrap(),
        None
    );
    // The right date at the wrong time does not count either.
    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 9, 10, 1), limit()).unwrap(),
        None
    );
    // Beyond the COUNT bound.
    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 16, 10, 0), limit()).unwrap(),
        None
    );
}

#[test]
fn lookups_round_trip() {
    let anchor = Anchor::new(wall(2026, 3, 2, 10, 0), wall(2026, 3, 2, 11, 0), Tz::UTC);
    let rule = Rule::new(
        Frequency::Weekly {
            by_day: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
        },
        1,
        Termination::Count(6),
    );

    for n in 1..=6 {
        let instant = date_at(&anchor, &rule, n, limit())
            .unwrap()
            .expect("n is within range");
        assert_eq!(
            position_of(&anchor, &rule, instant, limit()).unwrap(),
            Some(n),
            "position {} should round-trip",
            n
        );
    }
}

#[test]
fn lookups_describe_the_unmodified_series() {
    // The lookup surface takes no exception sets: a slot that a caller has
    // deleted or moved elsewhere still answers with its original instant.
    let anchor = Anchor::new(wall(2008, 10, 1, 14, 45), wall(2008, 10, 1, 15, 45), chrono_tz::Europe::Berlin);
    let rule = Rule::new(Frequency::Daily, 1, Termination::Count(5));

    assert_eq!(
        date_at(&anchor, &rule, 2, limit()).unwrap(),
        Some(utc(2008, 10, 2, 12, 45))
    );
    assert_eq!(
        position_of(&anchor, &rule, utc(2008, 10, 2, 12, 45), limit()).unwrap(),
        Some(2)
    );
}

#[test]
fn position_of_respects_until() {
    let anchor = Anchor::new(wall(2026, 3, 1, 9, 0), wall(2026, 3, 1, 10, 0), Tz::UTC);
    let rule = Rule::new(
        Frequency::Daily,
        1,
        Termination::Until(utc(2026, 3, 3, 9, 0)),
    );

    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 3, 9, 0), limit()).unwrap(),
        Some(3)
    );
    assert_eq!(
        position_of(&anchor, &rule, utc(2026, 3, 4, 9, 0), limit()).unwrap(),
        None
    );
}

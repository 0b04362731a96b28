//! Inverse position/date queries over the theoretical, exception-free
//! series. Exceptions and windows never apply here: both functions answer
//! questions about the series as the rule alone defines it.

use chrono::{DateTime, Utc};

use crate::config::CalculationLimit;
use crate::error::Result;
use crate::expander::Stepper;
use crate::localtime::Anchor;
use crate::rule::Rule;

/// The original n-th candidate's instant, or `None` when `n` is zero or the
/// series terminates before reaching it.
pub fn date_at(
    anchor: &Anchor,
    rule: &Rule,
    n: u32,
    limit: CalculationLimit,
) -> Result<Option<DateTime<Utc>>> {
    if n == 0 {
        return Ok(None);
    }
    let mut stepper = Stepper::new(anchor, rule, limit)?;
    while let Some(candidate) = stepper.next_candidate() {
        if candidate.position == n {
            return Ok(Some(candidate.start));
        }
    }
    Ok(None)
}

/// The 1-based position `instant` occupies in the original series, or
/// `None` when it does not land exactly on a generated candidate. Exact
/// inverse of [`date_at`] for every reachable position.
pub fn position_of(
    anchor: &Anchor,
    rule: &Rule,
    instant: DateTime<Utc>,
    limit: CalculationLimit,
) -> Result<Option<u32>> {
    let mut stepper = Stepper::new(anchor, rule, limit)?;
    while let Some(candidate) = stepper.next_candidate() {
        if candidate.start == instant {
            return Ok(Some(candidate.position));
        }
        if candidate.start > instant {
            break;
        }
    }
    Ok(None)
}

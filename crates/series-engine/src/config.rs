//! Externally sourced engine configuration.

use serde::{Deserialize, Serialize};

/// Cap on how many candidates the stepper may generate for one query.
///
/// Sourced from external configuration and passed explicitly into each
/// query; the engine never reads process-global state. Open-ended rules
/// truncate silently at this limit instead of doing unbounded work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationLimit(pub u32);

impl CalculationLimit {
    pub const DEFAULT: u32 = 1000;

    /// The effective limit. A misconfigured zero still yields one candidate,
    /// so the anchor itself is always reachable.
    pub fn get(self) -> u32 {
        self.0.max(1)
    }
}

impl Default for CalculationLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

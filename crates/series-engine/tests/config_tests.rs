//! Tests for the externally sourced calculation limit.

use serde::Deserialize;
use series_engine::CalculationLimit;

#[derive(Debug, Deserialize)]
struct EngineConfig {
    #[serde(default)]
    calculation_limit: CalculationLimit,
}

#[test]
fn default_limit_is_one_thousand() {
    assert_eq!(CalculationLimit::default().get(), 1000);
}

#[test]
fn limit_deserializes_from_a_config_fragment() {
    let config: EngineConfig =
        serde_json::from_str(r#"{"calculation_limit": 250}"#).expect("valid config");
    assert_eq!(config.calculation_limit, CalculationLimit(250));
}

#[test]
fn missing_limit_falls_back_to_the_default() {
    let config: EngineConfig = serde_json::from_str("{}").expect("valid config");
    assert_eq!(config.calculation_limit, CalculationLimit::default());
}

#[test]
fn zero_limit_still_reaches_the_anchor() {
    assert_eq!(CalculationLimit(0).get(), 1);
}

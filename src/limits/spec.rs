//! Limit definitions for coverage variant levels
//!
//! A level carries a per-claim limit and an aggregate limit. Each is either a
//! fixed amount or a percentage, never both. The tagged [`LimitValue`] makes
//! that hold by construction; [`RawLimitSpec`] is the optional-field shape
//! used at the deserialization boundary and is checked once on conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// How a limit is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitMode {
    #[serde(alias = "amt")]
    Amount,
    #[serde(alias = "pct")]
    Percentage,
}

impl fmt::Display for LimitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitMode::Amount => write!(f, "amount"),
            LimitMode::Percentage => write!(f, "percentage"),
        }
    }
}

impl FromStr for LimitMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amount" | "amt" => Ok(LimitMode::Amount),
            "percentage" | "pct" => Ok(LimitMode::Percentage),
            other => Err(EngineError::UnknownLimitMode(other.to_string())),
        }
    }
}

/// A single limit value in one of the two representations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum LimitValue {
    Amount(f64),
    Percentage(f64),
}

impl LimitValue {
    pub fn mode(&self) -> LimitMode {
        match self {
            LimitValue::Amount(_) => LimitMode::Amount,
            LimitValue::Percentage(_) => LimitMode::Percentage,
        }
    }

    /// The populated number, whichever mode it is in
    pub fn value(&self) -> f64 {
        match *self {
            LimitValue::Amount(v) | LimitValue::Percentage(v) => v,
        }
    }

    fn from_pair(
        mode: LimitMode,
        amount: Option<f64>,
        percent: Option<f64>,
        pair: &str,
    ) -> Result<Self, EngineError> {
        match (mode, amount, percent) {
            (LimitMode::Amount, Some(v), None) => Ok(LimitValue::Amount(v)),
            (LimitMode::Percentage, None, Some(v)) => Ok(LimitValue::Percentage(v)),
            (_, Some(_), Some(_)) => Err(EngineError::InvalidLimitSpec(format!(
                "{} has both amount and percentage populated",
                pair
            ))),
            (_, None, None) => Err(EngineError::InvalidLimitSpec(format!(
                "{} has neither amount nor percentage populated",
                pair
            ))),
            (mode, _, _) => Err(EngineError::InvalidLimitSpec(format!(
                "{} is declared as {} but the other value is populated",
                pair, mode
            ))),
        }
    }
}

/// Limit and aggregate limit of one coverage variant level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLimitSpec", into = "RawLimitSpec")]
pub struct LimitSpec {
    /// Per-claim limit
    pub limit: LimitValue,

    /// Cumulative limit across the level's claims
    pub aggregate: LimitValue,
}

impl LimitSpec {
    pub fn new(limit: LimitValue, aggregate: LimitValue) -> Self {
        Self { limit, aggregate }
    }

    /// Amount limit with an amount aggregate
    pub fn amounts(amount: f64, aggregate_amount: f64) -> Self {
        Self::new(LimitValue::Amount(amount), LimitValue::Amount(aggregate_amount))
    }

    /// Percentage limit with a percentage aggregate
    pub fn percentages(percent: f64, aggregate_percent: f64) -> Self {
        Self::new(
            LimitValue::Percentage(percent),
            LimitValue::Percentage(aggregate_percent),
        )
    }

    pub fn mode(&self) -> LimitMode {
        self.limit.mode()
    }

    pub fn aggregate_mode(&self) -> LimitMode {
        self.aggregate.mode()
    }
}

/// Wire shape of a limit record, as produced by form state or a level response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLimitSpec {
    pub mode: Option<LimitMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_of: Option<f64>,
    pub aggregate_mode: Option<LimitMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_percent: Option<f64>,
}

/// Infer a missing mode from whichever value is populated
fn infer_mode(mode: Option<LimitMode>, amount: Option<f64>, percent: Option<f64>) -> LimitMode {
    match (mode, amount, percent) {
        (Some(mode), _, _) => mode,
        (None, None, Some(_)) => LimitMode::Percentage,
        _ => LimitMode::Amount,
    }
}

impl TryFrom<RawLimitSpec> for LimitSpec {
    type Error = EngineError;

    fn try_from(raw: RawLimitSpec) -> Result<Self, Self::Error> {
        let mode = infer_mode(raw.mode, raw.amount, raw.percent_of);
        let aggregate_mode =
            infer_mode(raw.aggregate_mode, raw.aggregate_amount, raw.aggregate_percent);

        Ok(Self {
            limit: LimitValue::from_pair(mode, raw.amount, raw.percent_of, "limit")?,
            aggregate: LimitValue::from_pair(
                aggregate_mode,
                raw.aggregate_amount,
                raw.aggregate_percent,
                "aggregate limit",
            )?,
        })
    }
}

impl From<LimitSpec> for RawLimitSpec {
    fn from(spec: LimitSpec) -> Self {
        let split = |v: LimitValue| match v {
            LimitValue::Amount(a) => (Some(LimitMode::Amount), Some(a), None),
            LimitValue::Percentage(p) => (Some(LimitMode::Percentage), None, Some(p)),
        };
        let (mode, amount, percent_of) = split(spec.limit);
        let (aggregate_mode, aggregate_amount, aggregate_percent) = split(spec.aggregate);

        Self {
            mode,
            amount,
            percent_of,
            aggregate_mode,
            aggregate_amount,
            aggregate_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_amount_spec_converts() {
        let raw = RawLimitSpec {
            mode: Some(LimitMode::Amount),
            amount: Some(250.0),
            aggregate_mode: Some(LimitMode::Amount),
            aggregate_amount: Some(1000.0),
            ..Default::default()
        };

        let spec = LimitSpec::try_from(raw).unwrap();
        assert_eq!(spec, LimitSpec::amounts(250.0, 1000.0));
    }

    #[test]
    fn test_both_values_populated_is_rejected() {
        let raw = RawLimitSpec {
            mode: Some(LimitMode::Amount),
            amount: Some(250.0),
            percent_of: Some(10.0),
            aggregate_amount: Some(1000.0),
            ..Default::default()
        };

        let err = LimitSpec::try_from(raw).unwrap_err();
        assert!(matches!(err, EngineError::InvalidLimitSpec(_)));
    }

    #[test]
    fn test_mode_mismatch_is_rejected() {
        let raw = RawLimitSpec {
            mode: Some(LimitMode::Percentage),
            amount: Some(250.0),
            aggregate_amount: Some(1000.0),
            ..Default::default()
        };

        assert!(LimitSpec::try_from(raw).is_err());
    }

    #[test]
    fn test_missing_aggregate_is_rejected() {
        let raw = RawLimitSpec {
            amount: Some(250.0),
            ..Default::default()
        };

        assert!(LimitSpec::try_from(raw).is_err());
    }

    #[test]
    fn test_mode_inferred_from_populated_value() {
        let raw = RawLimitSpec {
            percent_of: Some(20.0),
            aggregate_percent: Some(50.0),
            ..Default::default()
        };

        let spec = LimitSpec::try_from(raw).unwrap();
        assert_eq!(spec.mode(), LimitMode::Percentage);
        assert_eq!(spec.aggregate_mode(), LimitMode::Percentage);
    }

    #[test]
    fn test_deserialize_accepts_short_mode_tags() {
        let json = r#"{"mode":"amt","amount":100,"aggregateMode":"amt","aggregateAmount":500}"#;
        let spec: LimitSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, LimitSpec::amounts(100.0, 500.0));

        let bad = r#"{"mode":"amt","aggregateMode":"amt","aggregateAmount":500}"#;
        assert!(serde_json::from_str::<LimitSpec>(bad).is_err());
    }

    #[test]
    fn test_raw_round_trip_keeps_modes() {
        let spec = LimitSpec::new(LimitValue::Amount(100.0), LimitValue::Percentage(40.0));
        let raw = RawLimitSpec::from(spec);
        assert_eq!(raw.percent_of, None);
        assert_eq!(raw.aggregate_percent, Some(40.0));
        assert_eq!(LimitSpec::try_from(raw).unwrap(), spec);
    }

    #[test]
    fn test_limit_mode_from_str() {
        assert_eq!("AMT".parse::<LimitMode>().unwrap(), LimitMode::Amount);
        assert_eq!("percentage".parse::<LimitMode>().unwrap(), LimitMode::Percentage);
        assert!("ratio".parse::<LimitMode>().is_err());
    }
}

//! Trigger conditions

use crate::context::{Context, ContextValue, EvalError, ParseEnumError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What runtime quantity a condition reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// Player position (published by the host, usually as corridor depth)
    PlayerPosition,
    /// Player movement speed
    PlayerSpeed,
    /// Elapsed game time in seconds
    GameTime,
    /// Name of the zone the player is in
    ZoneType,
    /// Time spent in the current zone
    DwellTime,
    /// Classified movement pattern
    MovementPattern,
}

impl ConditionType {
    /// Canonical context key for this condition type
    pub fn key(&self) -> &'static str {
        match self {
            Self::PlayerPosition => "PlayerPosition",
            Self::PlayerSpeed => "PlayerSpeed",
            Self::GameTime => "GameTime",
            Self::ZoneType => "ZoneType",
            Self::DwellTime => "DwellTime",
            Self::MovementPattern => "MovementPattern",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ConditionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PlayerPosition" => Ok(Self::PlayerPosition),
            "PlayerSpeed" => Ok(Self::PlayerSpeed),
            "GameTime" => Ok(Self::GameTime),
            "ZoneType" => Ok(Self::ZoneType),
            "DwellTime" => Ok(Self::DwellTime),
            "MovementPattern" => Ok(Self::MovementPattern),
            _ => Err(ParseEnumError {
                kind: "condition type",
                value: s.to_string(),
            }),
        }
    }
}

/// Comparison operator between a context value and a rule literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    /// Substring test over text values
    Contains,
    NotContains,
}

impl ComparisonOp {
    /// Apply the operator to `lhs OP rhs` with checked coercion.
    ///
    /// Float and int cross-compare numerically; ordering operators are
    /// numeric only; `Contains`/`NotContains` are substring tests. Every
    /// other combination is an [`EvalError`].
    pub fn apply(&self, lhs: &ContextValue, rhs: &ContextValue) -> Result<bool, EvalError> {
        match self {
            Self::GreaterThan | Self::LessThan | Self::GreaterOrEqual | Self::LessOrEqual => {
                let a = lhs.as_number().ok_or(EvalError::UnsupportedOperator {
                    op: self.name(),
                    value: lhs.type_name(),
                })?;
                let b = rhs.as_number().ok_or(EvalError::Incompatible {
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })?;
                Ok(match self {
                    Self::GreaterThan => a > b,
                    Self::LessThan => a < b,
                    Self::GreaterOrEqual => a >= b,
                    Self::LessOrEqual => a <= b,
                    _ => unreachable!(),
                })
            }
            Self::Equals => loose_eq(lhs, rhs),
            Self::NotEquals => loose_eq(lhs, rhs).map(|eq| !eq),
            Self::Contains | Self::NotContains => {
                let hay = lhs.as_text().ok_or(EvalError::UnsupportedOperator {
                    op: self.name(),
                    value: lhs.type_name(),
                })?;
                let needle = rhs.as_text().ok_or(EvalError::Incompatible {
                    lhs: lhs.type_name(),
                    rhs: rhs.type_name(),
                })?;
                let found = hay.contains(needle);
                Ok(if *self == Self::NotContains {
                    !found
                } else {
                    found
                })
            }
        }
    }

    /// Operator name as written in configuration documents
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::GreaterThan => "GreaterThan",
            Self::LessThan => "LessThan",
            Self::GreaterOrEqual => "GreaterOrEqual",
            Self::LessOrEqual => "LessOrEqual",
            Self::Contains => "Contains",
            Self::NotContains => "NotContains",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComparisonOp {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Equals" => Ok(Self::Equals),
            "NotEquals" => Ok(Self::NotEquals),
            "GreaterThan" => Ok(Self::GreaterThan),
            "LessThan" => Ok(Self::LessThan),
            "GreaterOrEqual" => Ok(Self::GreaterOrEqual),
            "LessOrEqual" => Ok(Self::LessOrEqual),
            "Contains" => Ok(Self::Contains),
            "NotContains" => Ok(Self::NotContains),
            _ => Err(ParseEnumError {
                kind: "operator",
                value: s.to_string(),
            }),
        }
    }
}

/// Equality with numeric cross-coercion; other cross-type pairs are
/// incompatible.
fn loose_eq(lhs: &ContextValue, rhs: &ContextValue) -> Result<bool, EvalError> {
    use ContextValue::*;
    match (lhs, rhs) {
        (Bool(a), Bool(b)) => Ok(a == b),
        (Text(a), Text(b)) => Ok(a == b),
        (Vec3(a), Vec3(b)) => Ok(a == b),
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => Ok(a == b),
            _ => Err(EvalError::Incompatible {
                lhs: lhs.type_name(),
                rhs: rhs.type_name(),
            }),
        },
    }
}

/// A single comparison between a named runtime value and a literal.
///
/// Conditions are AND-combined within a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    /// What to read
    pub condition_type: ConditionType,
    /// How to compare
    pub operator: ComparisonOp,
    /// The literal to compare against; a condition without a value is
    /// invalid and never matches
    pub value: Option<ContextValue>,
    /// Optional override of the context lookup key
    pub parameter: Option<String>,
}

impl TriggerCondition {
    /// Create a condition with a value
    pub fn new(
        condition_type: ConditionType,
        operator: ComparisonOp,
        value: impl Into<ContextValue>,
    ) -> Self {
        Self {
            condition_type,
            operator,
            value: Some(value.into()),
            parameter: None,
        }
    }

    /// Override the context lookup key
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// The key this condition reads from the context
    pub fn context_key(&self) -> &str {
        self.parameter
            .as_deref()
            .unwrap_or_else(|| self.condition_type.key())
    }

    /// A condition is valid when it has a literal to compare against
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Evaluate against a context, surfacing comparison faults.
    ///
    /// A missing context key is an ordinary failed condition, not an error.
    pub fn try_evaluate(&self, ctx: &Context) -> Result<bool, EvalError> {
        let Some(expected) = &self.value else {
            return Ok(false);
        };
        let Some(actual) = ctx.get(self.context_key()) else {
            return Ok(false);
        };
        self.operator.apply(actual, expected)
    }

    /// Evaluate against a context, fail-closed: incompatible comparisons
    /// count as a failed condition.
    pub fn evaluate(&self, ctx: &Context) -> bool {
        self.try_evaluate(ctx).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison() {
        let cond = TriggerCondition::new(
            ConditionType::PlayerSpeed,
            ComparisonOp::GreaterThan,
            5.0f32,
        );
        let ctx = Context::new().with("PlayerSpeed", 6.0f32);
        assert!(cond.evaluate(&ctx));

        let ctx = Context::new().with("PlayerSpeed", 4.0f32);
        assert!(!cond.evaluate(&ctx));
    }

    #[test]
    fn test_int_float_cross_comparison() {
        let cond = TriggerCondition::new(ConditionType::GameTime, ComparisonOp::GreaterOrEqual, 30i64);
        let ctx = Context::new().with("GameTime", 30.0f32);
        assert!(cond.evaluate(&ctx));
    }

    #[test]
    fn test_missing_key_fails_without_error() {
        let cond =
            TriggerCondition::new(ConditionType::PlayerSpeed, ComparisonOp::GreaterThan, 5.0f32);
        let ctx = Context::new();
        assert_eq!(cond.try_evaluate(&ctx), Ok(false));
    }

    #[test]
    fn test_incompatible_types_fail_closed() {
        let cond =
            TriggerCondition::new(ConditionType::ZoneType, ComparisonOp::GreaterThan, 5.0f32);
        let ctx = Context::new().with("ZoneType", "maintenance");

        assert!(cond.try_evaluate(&ctx).is_err());
        assert!(!cond.evaluate(&ctx));
    }

    #[test]
    fn test_contains() {
        let cond = TriggerCondition::new(ConditionType::ZoneType, ComparisonOp::Contains, "deep");
        let ctx = Context::new().with("ZoneType", "deep_maintenance");
        assert!(cond.evaluate(&ctx));

        let cond =
            TriggerCondition::new(ConditionType::ZoneType, ComparisonOp::NotContains, "deep");
        assert!(!cond.evaluate(&ctx));
    }

    #[test]
    fn test_parameter_overrides_lookup_key() {
        let cond = TriggerCondition::new(ConditionType::PlayerSpeed, ComparisonOp::LessThan, 1.0f32)
            .with_parameter("AverageSpeed");

        let ctx = Context::new()
            .with("PlayerSpeed", 9.0f32)
            .with("AverageSpeed", 0.5f32);

        assert_eq!(cond.context_key(), "AverageSpeed");
        assert!(cond.evaluate(&ctx));
    }

    #[test]
    fn test_condition_without_value_is_invalid() {
        let cond = TriggerCondition {
            condition_type: ConditionType::PlayerSpeed,
            operator: ComparisonOp::Equals,
            value: None,
            parameter: None,
        };
        let ctx = Context::new().with("PlayerSpeed", 5.0f32);

        assert!(!cond.is_valid());
        assert!(!cond.evaluate(&ctx));
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            "PlayerSpeed".parse::<ConditionType>().unwrap(),
            ConditionType::PlayerSpeed
        );
        assert_eq!(
            "GreaterOrEqual".parse::<ComparisonOp>().unwrap(),
            ComparisonOp::GreaterOrEqual
        );
        assert!("Velocity".parse::<ConditionType>().is_err());
        assert!(">=".parse::<ComparisonOp>().is_err());
    }
}

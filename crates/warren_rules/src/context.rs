//! Runtime values and the evaluation context

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Error raised by a comparison between incompatible values.
///
/// Callers on the evaluation path convert this to a failed condition
/// rather than propagating it, so a badly-typed rule can never abort a
/// tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The two operand types cannot be compared
    #[error("cannot compare {lhs} with {rhs}")]
    Incompatible {
        lhs: &'static str,
        rhs: &'static str,
    },
    /// The operator does not apply to the operand type
    #[error("operator {op} does not apply to {value}")]
    UnsupportedOperator {
        op: &'static str,
        value: &'static str,
    },
}

/// Error raised when parsing an enum name from a configuration document
#[derive(Debug, Clone, Error)]
#[error("unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// A loosely-typed runtime value.
///
/// Condition literals are restricted to the scalar variants; `Vec3` exists
/// so hosts can publish positions into the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContextValue {
    /// Floating point scalar
    Float(f32),
    /// Integer scalar
    Int(i64),
    /// Boolean flag
    Bool(bool),
    /// String value
    Text(String),
    /// 3D vector (positions, directions)
    Vec3([f32; 3]),
}

impl ContextValue {
    /// Human-readable type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Vec3(_) => "vec3",
        }
    }

    /// Numeric view of the value, if it has one
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// Text view of the value, if it has one
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check whether this is one of the scalar variants
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Vec3(_))
    }

    /// Parse a raw scalar token from a configuration document.
    ///
    /// Tries bool, then int, then float; anything else is text (with
    /// surrounding quotes stripped).
    pub fn parse_scalar(raw: &str) -> ContextValue {
        let raw = raw.trim();
        match raw {
            "true" => return ContextValue::Bool(true),
            "false" => return ContextValue::Bool(false),
            _ => {}
        }
        if let Ok(i) = raw.parse::<i64>() {
            return ContextValue::Int(i);
        }
        if let Ok(f) = raw.parse::<f32>() {
            return ContextValue::Float(f);
        }
        let unquoted = raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(raw);
        ContextValue::Text(unquoted.to_string())
    }
}

impl From<f32> for ContextValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<[f32; 3]> for ContextValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

/// The map of current runtime values rule conditions are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    values: HashMap<String, ContextValue>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, overwriting any existing entry
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Set a value only if the key is not already present
    pub fn set_if_absent(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Builder-style set
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Check for a key
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy every entry of `other` that does not collide with an existing
    /// key. Earlier layers always win.
    pub fn merge_absent(&mut self, other: &Context) {
        for (key, value) in &other.values {
            self.values
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.values.iter()
    }
}

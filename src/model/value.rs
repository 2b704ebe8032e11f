//! Scalar value type decoded from query results.
//!
//! Records coming back from a query capability are decoded into this tagged
//! union exactly once, at the executor boundary. Everything downstream works
//! with `Scalar` rather than open-ended driver values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single field value in a query record.
///
/// The aggregation queries issued by this crate only ever return numbers,
/// strings, booleans (run summaries) or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

// ============================================================================
// Type checking
// ============================================================================

impl Scalar {
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "NULL",
            Scalar::Bool(_) => "BOOLEAN",
            Scalar::Int(_) => "INTEGER",
            Scalar::Float(_) => "FLOAT",
            Scalar::String(_) => "STRING",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Scalar::Null) }

    /// Attempt to extract as i64. Integral floats are accepted because some
    /// stores report `sum()` over integers as a float.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            Scalar::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical string form used to key groups, communities and
    /// contingency-table labels.
    ///
    /// Strings are used verbatim unless they would read as another scalar
    /// (`"1"`, `"true"`, `"null"`) or start with a quote; those keep their
    /// quoted form so they never merge with a number or boolean. `Int(1)`
    /// and `Float(1.0)` share the key `1`.
    pub fn key(&self) -> String {
        match self {
            Scalar::String(s) if !reads_as_literal(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn reads_as_literal(s: &str) -> bool {
    s.starts_with('"') || matches!(s, "null" | "true" | "false") || s.parse::<f64>().is_ok()
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Scalar { fn from(v: bool) -> Self { Scalar::Bool(v) } }
impl From<i32> for Scalar { fn from(v: i32) -> Self { Scalar::Int(v as i64) } }
impl From<i64> for Scalar { fn from(v: i64) -> Self { Scalar::Int(v) } }
impl From<u32> for Scalar { fn from(v: u32) -> Self { Scalar::Int(v as i64) } }
impl From<f64> for Scalar { fn from(v: f64) -> Self { Scalar::Float(v) } }
impl From<String> for Scalar { fn from(v: String) -> Self { Scalar::String(v) } }
impl From<&str> for Scalar { fn from(v: &str) -> Self { Scalar::String(v.to_owned()) } }
impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Scalar::Null) }
}

/// Decode a JSON value handed over by a driver adapter.
///
/// Containers are rejected: no query issued by this crate returns lists or maps.
impl TryFrom<serde_json::Value> for Scalar {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;
        match value {
            Json::Null => Ok(Scalar::Null),
            Json::Bool(b) => Ok(Scalar::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Scalar::Int(i)),
                None => n.as_f64().map(Scalar::Float).ok_or_else(|| Error::TypeError {
                    expected: "number".into(),
                    got: n.to_string(),
                }),
            },
            Json::String(s) => Ok(Scalar::String(s)),
            Json::Array(_) => Err(Error::TypeError { expected: "scalar".into(), got: "LIST".into() }),
            Json::Object(_) => Err(Error::TypeError { expected: "scalar".into(), got: "MAP".into() }),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
        }
    }
}

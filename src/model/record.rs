//! Query records and typed field extraction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Scalar;
use crate::{Error, Result};

/// A single record returned by the query capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub values: HashMap<String, Scalar>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw access to a field.
    pub fn scalar(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key)
    }

    /// Get a typed value from the record. Missing fields are an error.
    pub fn get<T: FromScalar>(&self, key: &str) -> Result<T> {
        let val = self.values.get(key)
            .ok_or_else(|| Error::MissingField(key.to_string()))?;
        T::from_scalar(val)
    }

    /// Like [`Record::get`], but a missing field or a `null` yields `None`.
    ///
    /// Aggregates such as `sum()` over an empty match come back as `null`.
    pub fn get_opt<T: FromScalar>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            None | Some(Scalar::Null) => Ok(None),
            Some(val) => T::from_scalar(val).map(Some),
        }
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Scalar>, const N: usize> From<[(K, V); N]> for Record {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Decode a JSON object (one row as produced by most driver adapters).
impl TryFrom<serde_json::Value> for Record {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Object(map) => {
                let mut record = Record::new();
                for (key, val) in map {
                    record.values.insert(key, Scalar::try_from(val)?);
                }
                Ok(record)
            }
            other => Err(Error::TypeError {
                expected: "object".into(),
                got: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// FromScalar
// ============================================================================

/// Convert from Scalar to concrete types.
pub trait FromScalar: Sized {
    fn from_scalar(val: &Scalar) -> Result<Self>;
}

fn type_error(expected: &str, val: &Scalar) -> Error {
    Error::TypeError {
        expected: expected.into(),
        got: val.type_name().into(),
    }
}

impl FromScalar for Scalar {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        Ok(val.clone())
    }
}

impl FromScalar for String {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        match val {
            Scalar::String(s) => Ok(s.clone()),
            _ => Err(type_error("String", val)),
        }
    }
}

impl FromScalar for i64 {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        val.as_int().ok_or_else(|| type_error("Integer", val))
    }
}

/// Counts. Negative values violate the aggregation invariant.
impl FromScalar for u64 {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        let i = val.as_int().ok_or_else(|| type_error("Integer", val))?;
        u64::try_from(i).map_err(|_| Error::TypeError {
            expected: "non-negative count".into(),
            got: i.to_string(),
        })
    }
}

impl FromScalar for f64 {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        val.as_float().ok_or_else(|| type_error("Float", val))
    }
}

impl FromScalar for bool {
    fn from_scalar(val: &Scalar) -> Result<Self> {
        val.as_bool().ok_or_else(|| type_error("Boolean", val))
    }
}

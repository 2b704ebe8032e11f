//! Params: the parameter map sent alongside a query pattern.

use std::collections::HashMap;
use super::Scalar;

/// A map of parameter names to values (`$name` in the pattern).
pub type Params = HashMap<String, Scalar>;

/// Build a parameter map from `(name, value)` pairs.
pub fn params<K, V, I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Scalar>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

//! Relationship direction relative to the anchor node `n`.

use serde::{Deserialize, Serialize};

/// Which relationships count toward a node's degree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// `(n)<-[r]-(m)`
    In,
    /// `(n)-[r]->(m)`
    Out,
    /// `(n)-[r]-(m)`
    #[default]
    Both,
}

impl Direction {
    /// The relationship pattern anchored at `n`, reaching neighbor `m`.
    pub fn pattern(self) -> &'static str {
        match self {
            Direction::In => "(n)<-[r]-(m)",
            Direction::Out => "(n)-[r]->(m)",
            Direction::Both => "(n)-[r]-(m)",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
            Direction::Both => write!(f, "BOTH"),
        }
    }
}

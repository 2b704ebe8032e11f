//! Analyzer configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "substitution": "identifier",
//!   "page_rank": { "damping": 0.9 },
//!   "procedures": { "page_rank": "gds.pageRank.stream" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::SubstitutionStrategy;
use crate::{Error, Result};

/// Top-level configuration for an [`crate::Analyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// How node filters are mirrored onto the target endpoint.
    pub substitution: SubstitutionStrategy,
    /// Defaults for PageRank when the caller does not pass its own.
    pub page_rank: PageRankDefaults,
    /// Probability mass of the Beta-Binomial credible interval.
    pub credible_mass: f64,
    /// Names of the delegated procedures in the target store.
    pub procedures: ProcedureNames,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            substitution: SubstitutionStrategy::default(),
            page_rank: PageRankDefaults::default(),
            credible_mass: 0.95,
            procedures: ProcedureNames::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankDefaults {
    pub damping: f64,
    pub iterations: u32,
}

impl Default for PageRankDefaults {
    fn default() -> Self {
        Self { damping: 0.85, iterations: 20 }
    }
}

/// Procedure names for the delegated algorithms (Neo4j GDS by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureNames {
    pub page_rank: String,
    pub betweenness: String,
    pub label_propagation: String,
}

impl Default for ProcedureNames {
    fn default() -> Self {
        Self {
            page_rank: "gds.pageRank.stream".into(),
            betweenness: "gds.betweenness.stream".into(),
            label_propagation: "gds.labelPropagation.write".into(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        validate_page_rank(self.page_rank.damping, self.page_rank.iterations)?;
        if !(self.credible_mass > 0.0 && self.credible_mass < 1.0) {
            return Err(Error::Config(format!(
                "credible_mass must be in (0, 1), got {}", self.credible_mass
            )));
        }
        for (key, name) in [
            ("page_rank", &self.procedures.page_rank),
            ("betweenness", &self.procedures.betweenness),
            ("label_propagation", &self.procedures.label_propagation),
        ] {
            if name.trim().is_empty() {
                return Err(Error::Config(format!("procedures.{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Damping must lie in (0, 1) and at least one iteration must run.
pub(crate) fn validate_page_rank(damping: f64, iterations: u32) -> Result<()> {
    if !(damping > 0.0 && damping < 1.0) {
        return Err(Error::Config(format!("damping must be in (0, 1), got {damping}")));
    }
    if iterations == 0 {
        return Err(Error::Config("iterations must be at least 1".into()));
    }
    Ok(())
}

//! # Data Model
//!
//! DTOs that cross every boundary: executor ↔ engines ↔ caller.
//!
//! Design rule: this module is pure data. No I/O, no state, no async.

pub mod value;
pub mod record;
pub mod property_map;
pub mod relationship;
pub mod measures;

pub use value::Scalar;
pub use record::{Record, FromScalar};
pub use property_map::{Params, params};
pub use relationship::Direction;
pub use measures::{
    CentralityScores, DegreeBucket, DegreeDistribution,
    HypothesisResult, ChiSquareResult, CommunityRun,
    Posterior, BetaBinomialResult,
};

//! Momentum classifier
//!
//! The generic early-momentum categorization-and-comparison engine: score
//! every entity's early velocity, split the population into high/low
//! cohorts, and report the ratio of mean outcome between them. Pure and
//! synchronous; the same entity set can be re-split under any number of
//! configurations concurrently.

mod report;
mod split;
mod types;
mod velocity;

pub use report::{summarize, EffectDirection, EffectReport, Ratio};
pub use split::{rank_and_split, CohortSplit, SplitMode};
pub use types::{
    Eligibility, ExcludedEntity, ExclusionReason, IneligibleReason, MalformedEntity, ScoredEntity,
    SplitError,
};
pub use velocity::{compute_velocity, TimeUnit, VelocityMethod};

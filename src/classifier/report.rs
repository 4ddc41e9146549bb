//! Effect-size reporting
//!
//! Turns a cohort split into the directional comparison the analyses are
//! after: mean outcome of the high-velocity cohort over mean outcome of the
//! low-velocity cohort. A zero low-cohort mean is a legitimate result in
//! this domain (a cohort with no early activity that still produced
//! outcome), so the ratio carries explicit sentinels instead of throwing.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::split::CohortSplit;
use super::types::ScoredEntity;

/// Ratio of cohort means, with explicit sentinels for zero denominators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    Finite(f64),
    /// mean_low == 0 while mean_high > 0
    PositiveInfinity,
    /// Both cohort means are zero: equally inactive, reported not thrown
    Undefined,
}

impl Ratio {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Ratio::Finite(value) => Some(*value),
            Ratio::PositiveInfinity | Ratio::Undefined => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Finite(value) => write!(f, "{value:.2}x"),
            Ratio::PositiveInfinity => write!(f, "+inf"),
            Ratio::Undefined => write!(f, "undefined"),
        }
    }
}

/// Observed direction of the effect.
///
/// The source analyses disagree on direction across domains (GitHub repos
/// show gradual-start winning, NPM packages show fast-start winning), so
/// the direction is derived from the measured ratio and reported, never
/// assumed per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDirection {
    /// Early-fast cohort ends up with the higher long-run outcome
    Cascade,
    /// Early-fast cohort ends up with the lower long-run outcome
    Crystallization,
}

/// The comparison result handed to reporting/plotting collaborators.
///
/// Deterministic given identical inputs; fully serializable as a flat
/// record. Per-entity listings for both cohorts are included for later
/// inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectReport {
    pub mean_high: f64,
    pub mean_low: f64,
    pub ratio: Ratio,
    pub direction: Option<EffectDirection>,
    pub n_high: usize,
    pub n_low: usize,
    pub n_middle: usize,
    pub n_excluded: usize,
    pub n_malformed: usize,
    pub high: Vec<ScoredEntity>,
    pub low: Vec<ScoredEntity>,
}

fn mean(cohort: &[ScoredEntity]) -> f64 {
    if cohort.is_empty() {
        return 0.0;
    }
    cohort.iter().map(|e| e.outcome).sum::<f64>() / cohort.len() as f64
}

/// Compare cohort mean outcomes and assemble the report
pub fn summarize(split: &CohortSplit) -> EffectReport {
    let mean_high = mean(&split.high);
    let mean_low = mean(&split.low);

    let ratio = if mean_low > 0.0 {
        Ratio::Finite(mean_high / mean_low)
    } else if mean_high > 0.0 {
        Ratio::PositiveInfinity
    } else {
        Ratio::Undefined
    };

    let direction = match ratio {
        Ratio::Finite(value) if value > 1.0 => Some(EffectDirection::Cascade),
        Ratio::Finite(value) if value < 1.0 => Some(EffectDirection::Crystallization),
        Ratio::PositiveInfinity => Some(EffectDirection::Cascade),
        _ => None,
    };

    EffectReport {
        mean_high,
        mean_low,
        ratio,
        direction,
        n_high: split.high.len(),
        n_low: split.low.len(),
        n_middle: split.middle.len(),
        n_excluded: split.excluded.len(),
        n_malformed: split.malformed.len(),
        high: split.high.clone(),
        low: split.low.clone(),
    }
}

impl EffectReport {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let direction = match self.direction {
            Some(EffectDirection::Cascade) => "cascade (early-fast wins)",
            Some(EffectDirection::Crystallization) => "crystallization (early-slow wins)",
            None => "none",
        };

        let mut out = format!(
            r#"
══════════════════════════════════════════════════════
            EARLY MOMENTUM COMPARISON
══════════════════════════════════════════════════════

EFFECT
───────────────────────────────────────────────────────
Mean outcome (high):  {:.2}
Mean outcome (low):   {:.2}
Ratio:                {}
Direction:            {}

POPULATION
───────────────────────────────────────────────────────
High cohort:          {}
Low cohort:           {}
Middle band:          {}
Excluded:             {}
Malformed:            {}
"#,
            self.mean_high,
            self.mean_low,
            self.ratio,
            direction,
            self.n_high,
            self.n_low,
            self.n_middle,
            self.n_excluded,
            self.n_malformed,
        );

        out.push_str("\nTOP OF HIGH COHORT\n");
        for entity in self.high.iter().take(5) {
            out.push_str(&format!(
                "  {}: velocity {:.3}, outcome {:.1}\n",
                entity.id, entity.velocity, entity.outcome
            ));
        }
        out.push_str("\nBOTTOM OF LOW COHORT\n");
        for entity in self.low.iter().rev().take(5) {
            out.push_str(&format!(
                "  {}: velocity {:.3}, outcome {:.1}\n",
                entity.id, entity.velocity, entity.outcome
            ));
        }
        out.push_str("══════════════════════════════════════════════════════\n");
        out
    }
}

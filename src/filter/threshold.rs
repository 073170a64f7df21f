// src/filter/threshold.rs

use std::cmp::Ordering;

use crate::types::{CutoffMap, HitRecord, ScoreKind};

/// The two threshold sources a run can filter against. The variants also
/// carry each mode's natural significance ranking, so the pipeline never
/// needs to know which one it is driving.
#[derive(Debug, Clone)]
pub enum ThresholdPolicy {
    /// Fixed significance ceiling plus a minimum model-coverage fraction.
    Global {
        evalue_ceiling: f64,
        coverage_floor: f64,
    },
    /// Externally supplied per-profile score cutoffs. Profiles without a
    /// cutoff are excluded outright (intersection semantics), in addition to
    /// a ceiling on the full-sequence e-value.
    Trusted {
        rules: CutoffMap,
        evalue_ceiling: f64,
    },
}

impl ThresholdPolicy {
    /// Whether a candidate hit survives threshold filtering. Pure predicate.
    pub fn passes(&self, hit: &HitRecord) -> bool {
        match self {
            ThresholdPolicy::Global {
                evalue_ceiling,
                coverage_floor,
            } => hit.domain_evalue <= *evalue_ceiling && hit.coverage() >= *coverage_floor,
            ThresholdPolicy::Trusted {
                rules,
                evalue_ceiling,
            } => {
                let Some(rule) = rules.get(&hit.profile_id) else {
                    // No cutoff for this profile: silent drop, not an error.
                    return false;
                };
                let score_ok = match rule.score_kind {
                    ScoreKind::Domain => hit.domain_score >= rule.threshold,
                    ScoreKind::Full => hit.sequence_score >= rule.threshold,
                };
                score_ok && hit.sequence_evalue <= *evalue_ceiling
            }
        }
    }

    /// Significance ranking for this mode, best hit first: ascending domain
    /// e-value in global mode, descending domain score in trusted mode.
    pub fn rank(&self, a: &HitRecord, b: &HitRecord) -> Ordering {
        match self {
            ThresholdPolicy::Global { .. } => a.domain_evalue.total_cmp(&b.domain_evalue),
            ThresholdPolicy::Trusted { .. } => b.domain_score.total_cmp(&a.domain_score),
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, ThresholdPolicy::Trusted { .. })
    }
}

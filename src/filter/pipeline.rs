// src/filter/pipeline.rs

use ahash::AHashMap;
use rayon::prelude::*;

use super::overlap::select_nonoverlapping;
use super::threshold::ThresholdPolicy;
use crate::error::SiftError;
use crate::types::HitRecord;

/// Runs the whole post-processing pass over a hit table:
/// group by query, resolve overlapping calls per query, then apply the
/// threshold policy. Queries are independent, so multi-hit resolution runs
/// in parallel; `collect` keeps group order, so the result is deterministic.
///
/// Output rows are sorted by ascending query identifier; rows of the same
/// query keep their significance order.
pub fn run_pipeline(
    all_hits: Vec<HitRecord>,
    policy: &ThresholdPolicy,
    overlap_tolerance: Option<f64>,
) -> Result<Vec<HitRecord>, SiftError> {
    if let Some(t) = overlap_tolerance {
        if !(0.0..1.0).contains(&t) {
            return Err(SiftError::InvalidOverlap(t));
        }
    }

    // 1. Partition by query, in first-seen order.
    let mut group_of: AHashMap<String, usize> = AHashMap::new();
    let mut groups: Vec<Vec<HitRecord>> = Vec::new();
    for hit in all_hits {
        match group_of.get(&hit.query_id) {
            Some(&g) => groups[g].push(hit),
            None => {
                group_of.insert(hit.query_id.clone(), groups.len());
                groups.push(vec![hit]);
            }
        }
    }

    // 2. Resolve each query on its own.
    let resolved: Vec<Vec<HitRecord>> = groups
        .into_par_iter()
        .map(|group| resolve_group(group, policy, overlap_tolerance))
        .collect();

    // 3. Threshold filtering over the surviving candidates.
    let mut candidates: Vec<HitRecord> = resolved.into_iter().flatten().collect();
    candidates.retain(|hit| policy.passes(hit));

    // 4. Key the output by query; the stable sort keeps per-query order.
    candidates.sort_by(|a, b| a.query_id.cmp(&b.query_id));

    Ok(candidates)
}

/// Overlap resolution for one query's hits. A single hit passes through
/// untouched; there is nothing to overlap with.
fn resolve_group(
    mut group: Vec<HitRecord>,
    policy: &ThresholdPolicy,
    overlap_tolerance: Option<f64>,
) -> Vec<HitRecord> {
    if group.len() < 2 {
        return group;
    }

    group.sort_by(|a, b| policy.rank(a, b));
    let keep = select_nonoverlapping(&group, overlap_tolerance);

    group
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, hit)| hit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScoreKind, ThresholdRule};

    fn hit(query: &str, profile: &str, dom_eval: f64, start: u32, end: u32) -> HitRecord {
        HitRecord {
            query_id: query.to_string(),
            profile_id: profile.to_string(),
            profile_length: 100,
            sequence_evalue: dom_eval,
            sequence_score: 90.0,
            domain_evalue: dom_eval,
            domain_score: -dom_eval.log10(),
            alignment_start: start,
            alignment_end: end,
        }
    }

    fn lenient_global() -> ThresholdPolicy {
        ThresholdPolicy::Global {
            evalue_ceiling: 1.0,
            coverage_floor: 0.0,
        }
    }

    #[test]
    fn single_hit_queries_pass_straight_through() {
        let hits = vec![
            hit("Q1", "PF00001", 1e-20, 10, 50),
            hit("Q2", "PF00002", 1e-3, 5, 95),
        ];
        // The fast path would collapse multi-hit groups, but these queries
        // each carry one hit, so both survive with intervals untouched.
        let out = run_pipeline(hits.clone(), &lenient_global(), None).unwrap();
        assert_eq!(out, hits);
    }

    #[test]
    fn absent_tolerance_keeps_the_best_hit_per_query() {
        let hits = vec![
            hit("Q1", "A", 1e-20, 10, 50),
            hit("Q1", "B", 1e-10, 200, 240),
            hit("Q1", "C", 1e-5, 300, 340),
        ];
        let out = run_pipeline(hits, &lenient_global(), None).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].profile_id, "A");
    }

    #[test]
    fn zero_tolerance_drops_the_overlapping_hit() {
        let hits = vec![
            hit("Q1", "A", 1e-20, 10, 50),
            hit("Q1", "B", 1e-10, 40, 80),
        ];
        let out = run_pipeline(hits, &lenient_global(), Some(0.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].profile_id, "A");
    }

    #[test]
    fn tolerated_overlap_keeps_both_hits() {
        let hits = vec![
            hit("Q1", "A", 1e-20, 10, 50),
            hit("Q1", "B", 1e-10, 40, 80),
        ];
        // Intersection 11 over min length 41 is about 0.27.
        let out = run_pipeline(hits, &lenient_global(), Some(0.5)).unwrap();
        let profiles: Vec<&str> = out.iter().map(|h| h.profile_id.as_str()).collect();
        assert_eq!(profiles, vec!["A", "B"]);
    }

    #[test]
    fn resolution_runs_on_significance_order_not_input_order() {
        // B arrives first but A has the better e-value; with no tolerance
        // the survivor must be A.
        let hits = vec![
            hit("Q1", "B", 1e-10, 40, 80),
            hit("Q1", "A", 1e-20, 10, 50),
        ];
        let out = run_pipeline(hits, &lenient_global(), None).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].profile_id, "A");
    }

    #[test]
    fn sole_hit_under_coverage_floor_is_still_dropped() {
        let policy = ThresholdPolicy::Global {
            evalue_ceiling: 1.0,
            coverage_floor: 0.35,
        };
        // (41 - 11) / 100 = 0.30 coverage; single-hit passthrough does not
        // exempt it from thresholds.
        let hits = vec![hit("Q1", "PF00001", 1e-20, 11, 41)];
        let out = run_pipeline(hits, &policy, Some(0.0)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_profile_is_dropped_without_touching_other_queries() {
        let mut rules = crate::types::CutoffMap::new();
        rules.insert(
            "K00001".to_string(),
            ThresholdRule {
                threshold: 5.0,
                score_kind: ScoreKind::Domain,
            },
        );
        let policy = ThresholdPolicy::Trusted {
            rules,
            evalue_ceiling: 1.0,
        };

        let hits = vec![
            hit("Q1", "C", 1e-20, 10, 50),
            hit("Q2", "K00001", 1e-20, 10, 50),
        ];
        let out = run_pipeline(hits, &policy, Some(0.0)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].query_id, "Q2");
        assert_eq!(out[0].profile_id, "K00001");
    }

    #[test]
    fn trusted_output_profiles_are_a_subset_of_the_rules() {
        let mut rules = crate::types::CutoffMap::new();
        for k in ["K00001", "K00002"] {
            rules.insert(
                k.to_string(),
                ThresholdRule {
                    threshold: 5.0,
                    score_kind: ScoreKind::Domain,
                },
            );
        }
        let policy = ThresholdPolicy::Trusted {
            rules,
            evalue_ceiling: 1.0,
        };

        let hits = vec![
            hit("Q1", "K00001", 1e-20, 10, 50),
            hit("Q1", "K00009", 1e-30, 60, 90),
            hit("Q2", "K00002", 1e-10, 5, 40),
            hit("Q3", "K77777", 1e-40, 1, 99),
        ];
        let out = run_pipeline(hits, &policy, Some(0.0)).unwrap();
        for row in &out {
            assert!(
                matches!(row.profile_id.as_str(), "K00001" | "K00002"),
                "unexpected profile {}",
                row.profile_id
            );
        }
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn output_is_keyed_by_ascending_query_id() {
        let hits = vec![
            hit("scaffold_9", "A", 1e-20, 10, 50),
            hit("scaffold_10", "B", 1e-20, 10, 50),
            hit("scaffold_1", "C", 1e-20, 10, 50),
        ];
        let out = run_pipeline(hits, &lenient_global(), Some(0.0)).unwrap();
        let queries: Vec<&str> = out.iter().map(|h| h.query_id.as_str()).collect();
        // Lexicographic, so scaffold_10 sorts before scaffold_9.
        assert_eq!(queries, vec!["scaffold_1", "scaffold_10", "scaffold_9"]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let out = run_pipeline(Vec::new(), &lenient_global(), Some(0.0)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn repeated_runs_agree() {
        let hits = vec![
            hit("Q2", "A", 1e-12, 30, 70),
            hit("Q1", "B", 1e-20, 10, 50),
            hit("Q1", "C", 1e-15, 45, 95),
            hit("Q1", "D", 1e-9, 100, 140),
            hit("Q3", "E", 1e-4, 1, 99),
        ];
        let first = run_pipeline(hits.clone(), &lenient_global(), Some(0.1)).unwrap();
        for _ in 0..5 {
            let again = run_pipeline(hits.clone(), &lenient_global(), Some(0.1)).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn out_of_range_tolerance_is_rejected() {
        let hits = vec![hit("Q1", "A", 1e-20, 10, 50)];
        assert!(matches!(
            run_pipeline(hits.clone(), &lenient_global(), Some(1.0)),
            Err(SiftError::InvalidOverlap(_))
        ));
        assert!(matches!(
            run_pipeline(hits, &lenient_global(), Some(-0.2)),
            Err(SiftError::InvalidOverlap(_))
        ));
    }
}

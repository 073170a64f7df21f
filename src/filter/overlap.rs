// src/filter/overlap.rs

use crate::types::HitRecord;

/// First-fit greedy selection of mutually non-overlapping hits for a single
/// query.
///
/// `hits` must already be sorted best-first by the caller; the result depends
/// only on that order. Returns the positional indices of accepted hits, in
/// input order.
///
/// With no tolerance at all, no overlap test can be evaluated and only the
/// best hit is kept. With `Some(t)`, a candidate is rejected when the shared
/// positions of its closed interval with ANY already-accepted interval,
/// divided by the shorter of the two interval lengths, strictly exceed `t`.
/// So `Some(0.0)` keeps every hit that is pairwise disjoint from the
/// accepted set (adjacent intervals survive), not just the first one.
pub fn select_nonoverlapping(hits: &[HitRecord], overlap_tolerance: Option<f64>) -> Vec<usize> {
    if hits.is_empty() {
        return Vec::new();
    }
    let Some(tolerance) = overlap_tolerance else {
        return vec![0];
    };

    // Intervals accepted so far, local to this scan.
    let mut accepted: Vec<(u32, u32)> = Vec::new();
    let mut kept: Vec<usize> = Vec::new();

    for (i, hit) in hits.iter().enumerate() {
        let this = (hit.alignment_start, hit.alignment_end);
        let this_len = hit.interval_len();

        let overlapping = accepted.iter().any(|&ali| {
            let shortest = this_len.min(ali.1 - ali.0 + 1);
            let shared = intersection_len(this, ali);
            shared as f64 / shortest as f64 > tolerance
        });

        if !overlapping {
            accepted.push(this);
            kept.push(i);
        }
    }

    kept
}

/// Count of integer positions shared by two closed intervals.
fn intersection_len(a: (u32, u32), b: (u32, u32)) -> u32 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo > hi {
        0
    } else {
        hi - lo + 1
    }
}

// src/lib.rs
pub mod types;
pub mod error;
pub mod domtbl;
pub mod cutoffs;
pub mod filter;

use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use crate::cutoffs::parse_cutoff_table;
use crate::domtbl::read_domtbl_records;
use crate::error::SiftError;
use crate::filter::{run_pipeline, ThresholdPolicy};
use crate::types::HitRecord;

/// Settings for one filtering run. `overlap_tolerance` stays optional on
/// purpose: `None` (no overlap test possible, keep the single best hit per
/// query) and `Some(0.0)` (keep every pairwise-disjoint hit) are different
/// requests.
#[derive(Debug, Clone)]
pub struct SiftConfig {
    /// Maximum acceptable e-value for a reported hit.
    pub evalue_ceiling: f64,
    /// Minimum fraction of the profile model a hit must cover. Only applied
    /// without trusted cutoffs.
    pub coverage_floor: f64,
    /// Maximum allowed interval-overlap ratio between hits on one query.
    pub overlap_tolerance: Option<f64>,
    /// Per-profile score cutoff table; supplying one switches the run to
    /// trusted-cutoff filtering.
    pub trusted_cutoffs: Option<PathBuf>,
}

/// The retained hit table of one run. Rows are final: non-redundant per
/// query, above threshold, sorted by query identifier.
pub struct SiftResults {
    pub rows: Vec<HitRecord>,
    /// Whether the run filtered against trusted cutoffs; the rendered table
    /// carries a coverage column only in the coverage-based mode.
    pub trusted: bool,
}

impl SiftResults {
    /// Generate the output table text on demand, one tab-separated row per
    /// retained call.
    pub fn table(&self) -> String {
        let mut output = String::new();
        output.push_str(
            "query\tprofile\tprofile_len\tseq_evalue\tseq_score\tdom_evalue\tdom_score\tenv_from\tenv_to",
        );
        if !self.trusted {
            output.push_str("\tcoverage");
        }
        output.push('\n');

        for hit in &self.rows {
            write!(
                output,
                "{}\t{}\t{}\t{:e}\t{:.1}\t{:e}\t{:.1}\t{}\t{}",
                hit.query_id,
                hit.profile_id,
                hit.profile_length,
                hit.sequence_evalue,
                hit.sequence_score,
                hit.domain_evalue,
                hit.domain_score,
                hit.alignment_start,
                hit.alignment_end,
            )
            .unwrap();
            if !self.trusted {
                write!(output, "\t{:.4}", hit.coverage()).unwrap();
            }
            output.push('\n');
        }
        output
    }
}

/// Unified entry point: read a domtblout table, pick the threshold policy
/// from the config, and run the filter pipeline.
pub fn sift_hits<P: AsRef<Path>>(infile: P, config: &SiftConfig) -> Result<SiftResults, SiftError> {
    // 1. Read the hit table.
    let hits = read_domtbl_records(&infile)?;
    log::info!(
        "Read {} hits from {}",
        hits.len(),
        infile.as_ref().display()
    );

    // 2. Build the threshold policy. Trusted cutoffs load wholesale before
    // any filtering starts.
    let policy = match &config.trusted_cutoffs {
        Some(path) => {
            let rules = parse_cutoff_table(path)?;
            log::info!("Loaded {} trusted cutoffs from {}", rules.len(), path.display());
            ThresholdPolicy::Trusted {
                rules,
                evalue_ceiling: config.evalue_ceiling,
            }
        }
        None => ThresholdPolicy::Global {
            evalue_ceiling: config.evalue_ceiling,
            coverage_floor: config.coverage_floor,
        },
    };

    // 3. Group, resolve overlaps, filter.
    let trusted = policy.is_trusted();
    let rows = run_pipeline(hits, &policy, config.overlap_tolerance)?;
    log::info!("Kept {} hits after filtering", rows.len());

    Ok(SiftResults { rows, trusted })
}

//src/types.rs

use ahash::AHashMap;

/// A structured representation of one scored alignment hit, i.e. one data row
/// of an HMMER `--domtblout` table. For example:
///  profile  tlen  query  seqEval  seqScore  domEval  domScore  envFrom  envTo
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    /// Identifier of the scanned sequence (the grouping key).
    pub query_id: String,
    /// Identifier of the matched profile model, `.hmm` suffix stripped.
    pub profile_id: String,
    /// Length of the profile model, the coverage denominator.
    pub profile_length: u32,
    /// Significance of the best hit for the whole query sequence; repeated
    /// by the search tool on every row of that query.
    pub sequence_evalue: f64,
    pub sequence_score: f64,
    /// Significance of this specific domain hit (the domtblout i-Evalue).
    pub domain_evalue: f64,
    pub domain_score: f64,
    /// 1-based inclusive envelope coordinates on the profile, start <= end.
    pub alignment_start: u32,
    pub alignment_end: u32,
}

impl HitRecord {
    /// Fraction of the profile model covered by the alignment envelope.
    pub fn coverage(&self) -> f64 {
        (self.alignment_end - self.alignment_start) as f64 / self.profile_length as f64
    }

    /// Number of integer positions in the closed alignment interval.
    pub fn interval_len(&self) -> u32 {
        self.alignment_end - self.alignment_start + 1
    }
}

/// Which score a trusted cutoff is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    /// The per-domain score.
    Domain,
    /// The full-sequence score.
    Full,
}

/// One externally supplied score cutoff for a single profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRule {
    pub threshold: f64,
    pub score_kind: ScoreKind,
}

/// Trusted cutoffs keyed by profile accession.
pub type CutoffMap = AHashMap<String, ThresholdRule>;

//src/cutoffs.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SiftError;
use crate::types::{CutoffMap, ScoreKind, ThresholdRule};

/// Parses a trusted score-cutoff table in the KOfam ko_list format:
/// ```text
/// knum	threshold	score_type	...
/// K00001	329.57	domain	...
/// ```
/// Columns are located by name from the header line, so extra columns and a
/// different column order are fine. Returns a `CutoffMap` keyed by profile
/// accession; a duplicated accession keeps the last row.
pub fn parse_cutoff_table<P: AsRef<Path>>(path: P) -> Result<CutoffMap, SiftError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut header = String::new();
    reader.read_line(&mut header)?;
    let columns: Vec<&str> = header.trim_end().split('\t').collect();
    let knum_col = column_index(path, &columns, "knum")?;
    let threshold_col = column_index(path, &columns, "threshold")?;
    let kind_col = column_index(path, &columns, "score_type")?;
    let needed = knum_col.max(threshold_col).max(kind_col) + 1;

    let mut rules: CutoffMap = CutoffMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 2; // header was line 1
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < needed {
            return Err(SiftError::malformed(
                path,
                lineno,
                format!("expected at least {needed} fields, found {}", fields.len()),
            ));
        }

        let accession = fields[knum_col].trim();
        let threshold: f64 = fields[threshold_col].trim().parse().map_err(|_| {
            SiftError::malformed(
                path,
                lineno,
                format!("cannot parse threshold from {:?}", fields[threshold_col]),
            )
        })?;
        let score_kind = match fields[kind_col].trim() {
            "domain" => ScoreKind::Domain,
            "full" => ScoreKind::Full,
            other => {
                return Err(SiftError::malformed(
                    path,
                    lineno,
                    format!("unknown score_type {other:?} (expected \"domain\" or \"full\")"),
                ))
            }
        };

        rules.insert(
            accession.to_string(),
            ThresholdRule {
                threshold,
                score_kind,
            },
        );
    }

    Ok(rules)
}

fn column_index(path: &Path, columns: &[&str], name: &str) -> Result<usize, SiftError> {
    columns
        .iter()
        .position(|c| c.trim() == name)
        .ok_or_else(|| SiftError::malformed(path, 1, format!("missing column {name:?} in header")))
}

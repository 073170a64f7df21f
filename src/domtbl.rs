//src/domtbl.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;

use crate::error::SiftError;
use crate::types::HitRecord;

/// A domtblout data row carries 22 whitespace-separated fields before the
/// free-text description; we only need the columns through env-to.
const MIN_FIELDS: usize = 21;

/// Reads an HMMER `--domtblout` table into hit records, also supporting .gz.
///
/// Comment lines (leading `#`) and blank lines are skipped. Any data line
/// with too few fields, a non-numeric value, or an impossible coordinate
/// pair aborts the whole read; the caller gets no partial table.
pub fn read_domtbl_records<P: AsRef<Path>>(path: P) -> Result<Vec<HitRecord>, SiftError> {
    let path = path.as_ref();
    let f = File::open(path)?;

    // If the file ends with ".gz", wrap it in a MultiGzDecoder
    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    let reader: Box<dyn BufRead> = if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    };

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(SiftError::malformed(
                path,
                lineno,
                format!("expected at least {MIN_FIELDS} fields, found {}", fields.len()),
            ));
        }

        // domtblout columns (0-based): 0 target, 2 tlen, 3 query,
        // 6 seq E-value, 7 seq score, 12 i-Evalue, 13 domain score,
        // 19 env from, 20 env to.
        let profile_id = fields[0]
            .strip_suffix(".hmm")
            .unwrap_or(fields[0])
            .to_string();
        let profile_length: u32 = parse_field(path, lineno, "tlen", fields[2])?;
        let query_id = fields[3].to_string();
        let sequence_evalue: f64 = parse_field(path, lineno, "sequence E-value", fields[6])?;
        let sequence_score: f64 = parse_field(path, lineno, "sequence score", fields[7])?;
        let domain_evalue: f64 = parse_field(path, lineno, "domain i-Evalue", fields[12])?;
        let domain_score: f64 = parse_field(path, lineno, "domain score", fields[13])?;
        let alignment_start: u32 = parse_field(path, lineno, "env from", fields[19])?;
        let alignment_end: u32 = parse_field(path, lineno, "env to", fields[20])?;

        if profile_length == 0 {
            return Err(SiftError::malformed(path, lineno, "profile length must be positive"));
        }
        if alignment_start > alignment_end {
            return Err(SiftError::malformed(
                path,
                lineno,
                format!("envelope start {alignment_start} is past end {alignment_end}"),
            ));
        }

        records.push(HitRecord {
            query_id,
            profile_id,
            profile_length,
            sequence_evalue,
            sequence_score,
            domain_evalue,
            domain_score,
            alignment_start,
            alignment_end,
        });
    }

    Ok(records)
}

fn parse_field<T: FromStr>(
    path: &Path,
    lineno: usize,
    name: &str,
    raw: &str,
) -> Result<T, SiftError> {
    raw.parse().map_err(|_| {
        SiftError::malformed(path, lineno, format!("cannot parse {name} from {raw:?}"))
    })
}

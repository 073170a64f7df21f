use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use hmmsift::{sift_hits, SiftConfig};

/// Parses HMMER --domtblout output and reports 1 or several non-overlapping
/// hits matching thresholds per query.
#[derive(Parser, Debug)]
#[command(name = "hmmsift", version, about)]
struct Args {
    /// HMMER results file (--domtblout format, optionally gzipped)
    #[arg(short, long)]
    infile: PathBuf,

    /// E-value to use as threshold
    #[arg(short, long)]
    evalue: f64,

    /// Minimum hmm coverage (ignored when --trusted is given)
    #[arg(long, default_value_t = 0.35)]
    coverage: f64,

    /// Allowed overlapping fraction for hits on the same query; when omitted
    /// only the best hit per query is stored
    #[arg(long)]
    overlap: Option<f64>,

    /// Trusted score cutoffs to parse with (tab-separated, knum/threshold/score_type)
    #[arg(short, long)]
    trusted: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    outfile: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = SiftConfig {
        evalue_ceiling: args.evalue,
        coverage_floor: args.coverage,
        overlap_tolerance: args.overlap,
        trusted_cutoffs: args.trusted,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template("{spinner:.green} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.set_message(format!("Filtering {}...", args.infile.display()));

    let results = match sift_hits(&args.infile, &config) {
        Ok(results) => results,
        Err(err) => {
            spinner.finish_and_clear();
            eprintln!("hmmsift: {err}");
            return ExitCode::FAILURE;
        }
    };

    spinner.finish_with_message(format!("Kept {} hit(s).", results.rows.len()));

    let table = results.table();
    let written = match &args.outfile {
        Some(path) => fs::write(path, table),
        None => io::stdout().write_all(table.as_bytes()),
    };
    if let Err(err) = written {
        eprintln!("hmmsift: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

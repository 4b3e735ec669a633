use anyhow::{Context, Result};
use depthcore::compare_paired;
use log::{info, warn};
use std::io::{self, Write};

use crate::data_load::load_bed_pair;

pub mod args;

pub use args::CompareArgs;

pub fn compare_bins(args: CompareArgs) -> Result<()> {
    info!(
        "Running depthqc 'compare': {:?} (truth) vs {:?} (candidate)",
        args.truth, args.candidate
    );

    let pair = load_bed_pair(&args.truth, &args.candidate)?;
    if pair.truth.len() != pair.candidate.len() {
        warn!(
            "Tables differ in length ({} vs {}). Comparing the first {} bins.",
            pair.truth.len(),
            pair.candidate.len(),
            pair.truth.len().min(pair.candidate.len())
        );
    }

    let summary = compare_paired(&pair.truth, &pair.candidate)
        .with_context(|| format!("Cannot compare {:?} with {:?}", args.truth, args.candidate))?;

    if summary.total > 0 && (summary.truth_median == 0.0 || summary.candidate_median == 0.0) {
        warn!(
            "Median depth is zero (truth {}, candidate {}). Scaled values are not finite.",
            summary.truth_median, summary.candidate_median
        );
    }

    for &i in &summary.dropouts {
        warn!(
            "Candidate near zero where truth is deep: {} | {}",
            pair.truth[i], pair.candidate[i]
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", summary)?;
    }

    info!(
        "{} of {} bins out of tolerance",
        summary.out_of_tolerance, summary.total
    );
    Ok(())
}

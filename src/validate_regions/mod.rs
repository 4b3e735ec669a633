use anyhow::{Context, Result};
use depthcore::{compare, RegionVerdict};
use humantime::format_duration;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use log::{info, warn};
use std::{process::ExitCode, time::Instant};

use crate::{data_load::load_regions, oracle::SamtoolsDepth};

pub mod args;

pub use args::ValidateArgs;

/// Exit status when a region is out of tolerance.
const TOLERANCE_EXIT_CODE: u8 = 1;

pub fn validate_regions(args: ValidateArgs) -> Result<ExitCode> {
    let mode = args.normalization();
    info!(
        "Running depthqc 'validate' on {:?} against {:?} ({} mean)",
        args.candidate, args.alignment, mode
    );

    let records = load_regions(&args.candidate)?;
    if records.is_empty() {
        warn!("No regions loaded from {:?}. Nothing to validate.", args.candidate);
    }
    info!("Loaded {} candidate regions", records.len());

    let mut oracle = SamtoolsDepth::new(&args.samtools, &args.alignment)
        .with_min_mapq(args.min_mapq)
        .with_reference(args.reference.clone());

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} regions ({eta})",
        )?
        .progress_chars("#>-"),
    );

    let started = Instant::now();
    let verdict = compare::validate_regions(records.iter().progress_with(pb.clone()), &mut oracle, mode)
        .with_context(|| format!("Failed to recompute depth from {:?}", args.alignment))?;
    pb.finish_and_clear();

    match verdict {
        RegionVerdict::Pass { checked } => {
            info!(
                "All {} regions within tolerance. Took {}",
                checked,
                format_duration(started.elapsed())
            );
            Ok(ExitCode::SUCCESS)
        }
        RegionVerdict::Fail(failure) => {
            warn!(
                "Region {} (row {}) differs by {:.2}",
                failure.region,
                failure.index + 1,
                failure.difference()
            );
            println!("{}", failure);
            Ok(ExitCode::from(TOLERANCE_EXIT_CODE))
        }
    }
}

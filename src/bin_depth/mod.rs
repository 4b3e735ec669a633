use anyhow::{Context, Result};
use bytesize::ByteSize;
use depthcore::{BinAggregator, BinConfig};
use humantime::format_duration;
use log::info;
use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
    time::Instant,
};

use crate::{data_load::open_input, depth_stream::DepthStreamReader};

pub mod args;

pub use args::BinArgs;

pub fn bin_depth(args: BinArgs) -> Result<()> {
    info!(
        "Running depthqc 'bin' on chromosome '{}' with width {}",
        &args.chrom, args.width
    );

    let ceiling = resolve_ceiling(&args)?;
    match ceiling {
        Some(ceiling) => info!("Binning '{}' up to {}", &args.chrom, ceiling),
        None => info!("No chromosome length given. Bins end at the last observed position."),
    }

    let config = BinConfig::new(&args.chrom, args.width)
        .with_report_width(args.report_width.unwrap_or(args.width))
        .with_ceiling(ceiling);
    let aggregator = BinAggregator::new(config).context("Invalid binning options")?;

    if args.input != Path::new("-") {
        let size = fs::metadata(&args.input)
            .with_context(|| format!("Could not stat depth input: {:?}", args.input))?
            .len();
        info!("Reading depth from {:?} ({})", args.input, ByteSize::b(size));
    } else {
        info!("Reading depth from stdin");
    }

    let input = open_input(&args.input)?;
    let mut depth_stream = DepthStreamReader::new(input, &args.chrom);

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());

    let started = Instant::now();
    let stats = aggregator
        .aggregate(&mut depth_stream, |bin| {
            writeln!(writer, "{}", bin)?;
            Ok(())
        })
        .with_context(|| format!("Failed to bin depth for '{}'", &args.chrom))?;
    writer.flush()?;

    info!(
        "Binned {} depth records ({} read) into {} bins: {} observed, {} zero-filled. Took {}",
        stats.records,
        depth_stream.records_read(),
        stats.emitted,
        stats.observed_bins,
        stats.filler_bins,
        format_duration(started.elapsed())
    );

    Ok(())
}

fn resolve_ceiling(args: &BinArgs) -> Result<Option<u64>> {
    if let Some(ceiling) = args.ceiling {
        return Ok(Some(ceiling));
    }

    let Some(fai) = &args.fai else {
        return Ok(None);
    };

    let lengths = crate::data_load::load_chrom_lengths(fai)
        .with_context(|| format!("Error loading chromosome lengths from: {:?}", fai))?;
    let length = lengths
        .get(&args.chrom)
        .copied()
        .with_context(|| format!("Chromosome '{}' not found in {:?}", &args.chrom, fai))?;
    Ok(Some(length))
}

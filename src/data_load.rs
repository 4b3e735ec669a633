use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use depthcore::{DepthError, RegionRecord};
use flate2::read::MultiGzDecoder;
use log::{debug, warn};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    path::Path,
};

const INPUT_BUFFER: usize = 256 * 1024;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open `path` for reading; `-` is stdin. Gzip and bgzip input is decoded
/// transparently, detected by extension or magic bytes.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::with_capacity(INPUT_BUFFER, io::stdin())));
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open input at: {:?}", path))?;
    let mut reader = BufReader::with_capacity(INPUT_BUFFER, file);

    let has_gz_extension = path.extension().is_some_and(|ext| ext == "gz");
    let has_gz_magic = reader
        .fill_buf()
        .with_context(|| format!("Failed to read from: {:?}", path))?
        .starts_with(&GZIP_MAGIC);

    if has_gz_extension || has_gz_magic {
        debug!("Reading {:?} as gzip", path);
        Ok(Box::new(BufReader::with_capacity(
            INPUT_BUFFER,
            MultiGzDecoder::new(reader),
        )))
    } else {
        Ok(Box::new(reader))
    }
}

/// Read `chrom start end value` rows in file order.
///
/// The first row with fewer than four fields is treated as the end of the
/// file; everything after it is ignored. Trailing blank fields do not count,
/// and a blank line is a row with no fields. A complete row with a
/// non-numeric field is an error.
pub fn read_regions<R: Read>(reader: R, source: &str) -> Result<Vec<RegionRecord>, DepthError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .from_reader(reader);
    let mut record = StringRecord::new();
    let mut regions = Vec::new();

    loop {
        let line = rdr.position().line();
        if !rdr.read_record(&mut record)? {
            break;
        }

        // csv skips empty lines; more than one line consumed means one was skipped
        let consumed = rdr.position().line() - line;
        let fields = if consumed > 1 {
            0
        } else {
            (0..record.len())
                .rposition(|i| !record[i].trim().is_empty())
                .map_or(0, |last| last + 1)
        };

        if fields < 4 {
            warn!(
                "Truncating '{}' at line {}: expected 4 fields, found {}",
                source, line, fields
            );
            break;
        }

        let parse_error = |field: &str, value: &str| DepthError::Parse {
            line,
            message: format!("Invalid {} in '{}': '{}'", field, source, value),
        };

        let start: u64 = record[1]
            .trim()
            .parse()
            .map_err(|_| parse_error("start", &record[1]))?;
        let end: u64 = record[2]
            .trim()
            .parse()
            .map_err(|_| parse_error("end", &record[2]))?;
        let value: f64 = record[3]
            .trim()
            .parse()
            .map_err(|_| parse_error("value", &record[3]))?;

        regions.push(RegionRecord::new(record[0].trim(), start, end, value));
    }

    Ok(regions)
}

pub fn load_regions<P: AsRef<Path>>(path: P) -> Result<Vec<RegionRecord>> {
    let path = path.as_ref();
    let source = path.display().to_string();
    let reader = open_input(path)?;
    read_regions(reader, &source).with_context(|| format!("Error loading regions from: {:?}", path))
}

/// Ground-truth and candidate tables, each in its own file order.
#[derive(Debug)]
pub struct BedPair {
    pub truth: Vec<RegionRecord>,
    pub candidate: Vec<RegionRecord>,
}

/// Load both tables independently. They are not compared or aligned here.
pub fn load_bed_pair<P: AsRef<Path>, Q: AsRef<Path>>(truth: P, candidate: Q) -> Result<BedPair> {
    let truth = load_regions(truth)?;
    let candidate = load_regions(candidate)?;
    Ok(BedPair { truth, candidate })
}

/// Chromosome lengths from a `samtools faidx` index (`name  length ...`).
pub fn load_chrom_lengths<P: AsRef<Path>>(path: P) -> Result<AHashMap<String, u64>> {
    let path = path.as_ref();
    let reader = open_input(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(reader);
    let mut record = StringRecord::new();
    let mut lengths = AHashMap::new();

    while rdr
        .read_record(&mut record)
        .with_context(|| format!("Error reading index: {:?}", path))?
    {
        let line = record.position().map_or(0, |p| p.line());
        if record.len() < 2 {
            bail!(
                "Index {:?} line {}: expected at least 2 fields, found {}",
                path,
                line,
                record.len()
            );
        }
        let length: u64 = record[1].trim().parse().with_context(|| {
            format!(
                "Index {:?} line {}: invalid length '{}'",
                path, line, &record[1]
            )
        })?;
        lengths.insert(record[0].to_string(), length);
    }

    Ok(lengths)
}

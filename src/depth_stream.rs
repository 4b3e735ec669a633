use csv::{ReaderBuilder, StringRecord};
use depthcore::{DepthError, DepthRecord};
use log::debug;
use std::io::Read;

/// Lazy reader over `chrom  pos  depth` rows for a single chromosome.
///
/// The stream must keep each chromosome contiguous and positions ascending.
/// Iteration ends for good at the first row of another chromosome, and after
/// the first error.
pub struct DepthStreamReader<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
    target_chrom: String,
    records_read: u64,
    done: bool,
}

impl<R: Read> DepthStreamReader<R> {
    pub fn new(reader: R, target_chrom: &str) -> Self {
        let rdr = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        DepthStreamReader {
            reader: rdr,
            record: StringRecord::with_capacity(64, 3),
            target_chrom: target_chrom.to_string(),
            records_read: 0,
            done: false,
        }
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Parse the buffered row; `None` when it belongs to another chromosome.
    fn parse_current(&self) -> Result<Option<DepthRecord>, DepthError> {
        let line = self.record.position().map_or(0, |p| p.line());

        if self.record.len() < 3 {
            return Err(DepthError::Parse {
                line,
                message: format!("Expected 3 fields, got {}", self.record.len()),
            });
        }

        if self.record[0].trim() != self.target_chrom {
            debug!(
                "Leaving '{}' at line {}: found '{}'",
                self.target_chrom, line, &self.record[0]
            );
            return Ok(None);
        }

        let position_str = self.record[1].trim();
        let position: u64 = position_str.parse().map_err(|_| DepthError::Parse {
            line,
            message: format!("Invalid position: '{}'", position_str),
        })?;

        let depth_str = self.record[2].trim();
        let depth: f64 = depth_str.parse().map_err(|_| DepthError::Parse {
            line,
            message: format!("Invalid depth: '{}'", depth_str),
        })?;

        Ok(Some(DepthRecord::new(position, depth)))
    }
}

impl<R: Read> Iterator for DepthStreamReader<R> {
    type Item = Result<DepthRecord, DepthError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        }

        match self.parse_current() {
            Ok(Some(record)) => {
                self.records_read += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

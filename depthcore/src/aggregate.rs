use log::debug;

use crate::{Bin, DepthError, DepthRecord, Result};

/// Bin width used by coverage-index tools (one BAM linear-index tile).
pub const DEFAULT_BIN_WIDTH: u64 = 16384;

/// Settings for one aggregation pass over a single chromosome.
///
/// # Fields
/// - `width`: aggregation width. Group means are always divided by this.
/// - `report_width`: width of the emitted bins. Must divide `width`.
/// - `ceiling`: chromosome length. No bin starting at or after it is emitted,
///   and the output is zero-filled up to it once the stream ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinConfig {
    pub chrom: String,
    pub width: u64,
    pub report_width: u64,
    pub ceiling: Option<u64>,
}

impl BinConfig {
    pub fn new(chrom: &str, width: u64) -> Self {
        Self {
            chrom: chrom.to_string(),
            width,
            report_width: width,
            ceiling: None,
        }
    }

    pub fn with_report_width(mut self, report_width: u64) -> Self {
        self.report_width = report_width;
        self
    }

    pub fn with_ceiling(mut self, ceiling: Option<u64>) -> Self {
        self.ceiling = ceiling;
        self
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AggregateStats {
    /// Depth records consumed from the stream.
    pub records: u64,
    /// Aggregate bins with at least one observed record.
    pub observed_bins: u64,
    /// Aggregate bins emitted as zero filler.
    pub filler_bins: u64,
    /// Reporting bins handed to the sink.
    pub emitted: u64,
}

/// Groups a position-sorted depth stream into gapless fixed-width bins.
///
/// Consecutive records that fall in the same `position / width` slot form a
/// group; the slot's mean is the group's depth sum divided by the full width,
/// so positions missing from the stream count as zero depth. Slots skipped by
/// the stream are emitted as zero bins before the next observed slot.
///
/// An aggregator is consumed by [`BinAggregator::aggregate`]; build a new one
/// for every pass.
///
/// # Examples
/// ```
/// use depthcore::{BinAggregator, BinConfig, DepthRecord};
///
/// let records: Vec<depthcore::Result<DepthRecord>> = vec![Ok(DepthRecord::new(16384, 5.0))];
/// let bins = BinAggregator::new(BinConfig::new("1", 16384))
///     .unwrap()
///     .aggregate_to_vec(records)
///     .unwrap();
///
/// assert_eq!(bins.len(), 2);
/// assert_eq!(bins[0].mean_depth, 0.0);
/// ```
#[derive(Debug)]
pub struct BinAggregator {
    config: BinConfig,
    /// Index of the next aggregate slot to emit. Only moves forward.
    next_index: u64,
    stats: AggregateStats,
}

impl BinAggregator {
    pub fn new(config: BinConfig) -> Result<Self> {
        if config.width == 0 {
            return Err(DepthError::InvalidConfig(
                "bin width must be greater than zero".to_string(),
            ));
        }
        if config.report_width == 0 {
            return Err(DepthError::InvalidConfig(
                "report width must be greater than zero".to_string(),
            ));
        }
        if config.width % config.report_width != 0 {
            return Err(DepthError::InvalidConfig(format!(
                "report width ({}) must divide bin width ({})",
                config.report_width, config.width
            )));
        }

        Ok(Self {
            config,
            next_index: 0,
            stats: AggregateStats::default(),
        })
    }

    pub fn config(&self) -> &BinConfig {
        &self.config
    }

    /// Consume `records` in one pass, handing every emitted bin to `sink`.
    ///
    /// Reading stops at the first group starting at or past the ceiling, so
    /// the remainder of the stream is never pulled.
    pub fn aggregate<I, F>(mut self, records: I, mut sink: F) -> Result<AggregateStats>
    where
        I: IntoIterator<Item = Result<DepthRecord>>,
        F: FnMut(Bin) -> Result<()>,
    {
        let width = self.config.width;
        // (slot index, depth sum) of the group being accumulated
        let mut group: Option<(u64, f64)> = None;

        for record in records {
            let record = record?;
            let index = record.position / width;

            if let Some((current, sum)) = group.as_mut() {
                if *current == index {
                    *sum += record.depth;
                    self.stats.records += 1;
                    continue;
                }
            }

            if let Some((current, sum)) = group.take() {
                self.flush_group(current, sum, &mut sink)?;
            }

            if index < self.next_index {
                return Err(DepthError::Unsorted {
                    position: record.position,
                    cursor: self.next_index * width,
                });
            }

            if self.is_past_ceiling(index) {
                debug!(
                    "Stopping '{}' at position {}: past ceiling {:?}",
                    self.config.chrom, record.position, self.config.ceiling
                );
                break;
            }

            self.stats.records += 1;
            group = Some((index, record.depth));
        }

        if let Some((current, sum)) = group.take() {
            self.flush_group(current, sum, &mut sink)?;
        }

        if let Some(ceiling) = self.config.ceiling {
            self.fill_until(ceiling.div_ceil(width), &mut sink)?;
        }

        Ok(self.stats)
    }

    /// Convenience wrapper collecting the bins of [`BinAggregator::aggregate`].
    pub fn aggregate_to_vec<I>(self, records: I) -> Result<Vec<Bin>>
    where
        I: IntoIterator<Item = Result<DepthRecord>>,
    {
        let mut bins = Vec::new();
        self.aggregate(records, |bin| {
            bins.push(bin);
            Ok(())
        })?;
        Ok(bins)
    }

    fn is_past_ceiling(&self, index: u64) -> bool {
        self.config
            .ceiling
            .is_some_and(|ceiling| index * self.config.width >= ceiling)
    }

    fn flush_group<F>(&mut self, index: u64, sum: f64, sink: &mut F) -> Result<()>
    where
        F: FnMut(Bin) -> Result<()>,
    {
        self.fill_until(index, sink)?;

        let mean_depth = sum / self.config.width as f64;
        self.emit_slot(index, mean_depth, sink)?;
        self.stats.observed_bins += 1;
        self.next_index = index + 1;
        Ok(())
    }

    /// Emit zero bins for every slot from the cursor up to, not including, `index`.
    fn fill_until<F>(&mut self, index: u64, sink: &mut F) -> Result<()>
    where
        F: FnMut(Bin) -> Result<()>,
    {
        if self.next_index < index {
            debug!(
                "Zero-filling {} silent bins on '{}' from {}",
                index - self.next_index,
                self.config.chrom,
                self.next_index * self.config.width
            );
        }
        while self.next_index < index {
            self.emit_slot(self.next_index, 0.0, sink)?;
            self.stats.filler_bins += 1;
            self.next_index += 1;
        }
        Ok(())
    }

    /// Replicate one aggregate slot across its reporting sub-bins.
    fn emit_slot<F>(&mut self, index: u64, mean_depth: f64, sink: &mut F) -> Result<()>
    where
        F: FnMut(Bin) -> Result<()>,
    {
        let BinConfig {
            chrom,
            width,
            report_width,
            ceiling,
        } = &self.config;

        let slot_start = index * width;
        for k in 0..(width / report_width) {
            let start = slot_start + k * report_width;
            if ceiling.is_some_and(|ceiling| start >= ceiling) {
                break;
            }
            sink(Bin::new(chrom, start, start + report_width, mean_depth))?;
            self.stats.emitted += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(u64, f64)]) -> Vec<Result<DepthRecord>> {
        rows.iter()
            .map(|&(position, depth)| Ok(DepthRecord::new(position, depth)))
            .collect()
    }

    fn assert_partitions(bins: &[Bin], report_width: u64, ceiling: u64) {
        let mut expected_start = 0;
        for bin in bins {
            assert_eq!(bin.start, expected_start, "gap or overlap at {:?}", bin);
            assert_eq!(bin.width(), report_width);
            expected_start = bin.end;
        }
        assert!(expected_start >= ceiling);
        assert!(bins.last().map_or(true, |b| b.start < ceiling));
    }

    #[test]
    fn test_full_bin_of_constant_depth() {
        let rows: Vec<(u64, f64)> = (0..16384).map(|p| (p, 10.0)).collect();
        let bins = BinAggregator::new(BinConfig::new("1", DEFAULT_BIN_WIDTH))
            .unwrap()
            .aggregate_to_vec(records(&rows))
            .unwrap();

        assert_eq!(bins, vec![Bin::new("1", 0, 16384, 10.0)]);
        assert_eq!(bins[0].to_string(), "1\t0\t16384\t10.00");
    }

    #[test]
    fn test_divides_by_width_not_observed_count() {
        let bins = BinAggregator::new(BinConfig::new("1", DEFAULT_BIN_WIDTH))
            .unwrap()
            .aggregate_to_vec(records(&[(16384, 5.0)]))
            .unwrap();

        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0], Bin::new("1", 0, 16384, 0.0));
        assert_eq!(bins[1].start, 16384);
        assert_eq!(bins[1].end, 32768);
        assert_eq!(bins[1].mean_depth, 5.0 / 16384.0);
        assert_eq!(bins[1].to_string(), "1\t16384\t32768\t0.00");
    }

    #[test]
    fn test_sparse_group_mean() {
        let bins = BinAggregator::new(BinConfig::new("1", 4))
            .unwrap()
            .aggregate_to_vec(records(&[(0, 2.0), (3, 6.0), (5, 4.0)]))
            .unwrap();

        assert_eq!(
            bins,
            vec![Bin::new("1", 0, 4, 2.0), Bin::new("1", 4, 8, 1.0)]
        );
    }

    #[test]
    fn test_fills_long_silent_stretch() {
        let bins = BinAggregator::new(BinConfig::new("1", 10))
            .unwrap()
            .aggregate_to_vec(records(&[(5, 10.0), (95, 20.0)]))
            .unwrap();

        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].mean_depth, 1.0);
        assert!(bins[1..9].iter().all(|b| b.mean_depth == 0.0));
        assert_eq!(bins[9], Bin::new("1", 90, 100, 2.0));
        assert_partitions(&bins, 10, 100);
    }

    #[test]
    fn test_partitions_up_to_ceiling() {
        let config = BinConfig::new("1", 10).with_ceiling(Some(95));
        let mut bins = Vec::new();
        let stats = BinAggregator::new(config)
            .unwrap()
            .aggregate(records(&[(12, 3.0), (13, 7.0), (41, 1.0)]), |bin| {
                bins.push(bin);
                Ok(())
            })
            .unwrap();

        assert_partitions(&bins, 10, 95);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[1].mean_depth, 1.0);
        assert_eq!(stats.observed_bins, 2);
        assert_eq!(stats.filler_bins, 8);
        assert_eq!(stats.records, 3);
    }

    #[test]
    fn test_stops_reading_past_ceiling() {
        let rows = vec![
            Ok(DepthRecord::new(5, 10.0)),
            Ok(DepthRecord::new(20, 10.0)),
            Err(DepthError::Parse {
                line: 3,
                message: "never reached".to_string(),
            }),
        ];
        let bins = BinAggregator::new(BinConfig::new("1", 10).with_ceiling(Some(20)))
            .unwrap()
            .aggregate_to_vec(rows)
            .unwrap();

        assert_eq!(
            bins,
            vec![Bin::new("1", 0, 10, 1.0), Bin::new("1", 10, 20, 0.0)]
        );
    }

    #[test]
    fn test_all_zero_depth() {
        let rows: Vec<(u64, f64)> = (0..50).map(|p| (p * 3, 0.0)).collect();
        let bins = BinAggregator::new(BinConfig::new("1", 8).with_ceiling(Some(200)))
            .unwrap()
            .aggregate_to_vec(records(&rows))
            .unwrap();

        assert_partitions(&bins, 8, 200);
        assert!(bins.iter().all(|b| b.to_string().ends_with("\t0.00")));
    }

    #[test]
    fn test_report_width_replicates_mean() {
        let config = BinConfig::new("1", 8).with_report_width(4);
        let bins = BinAggregator::new(config)
            .unwrap()
            .aggregate_to_vec(records(&[(9, 16.0)]))
            .unwrap();

        assert_eq!(
            bins,
            vec![
                Bin::new("1", 0, 4, 0.0),
                Bin::new("1", 4, 8, 0.0),
                Bin::new("1", 8, 12, 2.0),
                Bin::new("1", 12, 16, 2.0),
            ]
        );
    }

    #[test]
    fn test_report_width_respects_ceiling() {
        let config = BinConfig::new("1", 8)
            .with_report_width(2)
            .with_ceiling(Some(13));
        let bins = BinAggregator::new(config)
            .unwrap()
            .aggregate_to_vec(records(&[(1, 8.0)]))
            .unwrap();

        assert_partitions(&bins, 2, 13);
        assert_eq!(bins.len(), 7);
        assert!(bins[..4].iter().all(|b| b.mean_depth == 1.0));
    }

    #[test]
    fn test_identical_input_identical_output() {
        let rows: Vec<(u64, f64)> = (0..500).step_by(7).map(|p| (p, (p % 13) as f64)).collect();
        let run = || {
            BinAggregator::new(BinConfig::new("1", 32).with_ceiling(Some(600)))
                .unwrap()
                .aggregate_to_vec(records(&rows))
                .unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_empty_stream() {
        let bins = BinAggregator::new(BinConfig::new("1", 10))
            .unwrap()
            .aggregate_to_vec(Vec::new())
            .unwrap();
        assert!(bins.is_empty());

        let bins = BinAggregator::new(BinConfig::new("1", 10).with_ceiling(Some(25)))
            .unwrap()
            .aggregate_to_vec(Vec::new())
            .unwrap();
        assert_partitions(&bins, 10, 25);
        assert_eq!(bins.len(), 3);
    }

    #[test]
    fn test_parse_error_propagates() {
        let rows = vec![
            Ok(DepthRecord::new(1, 1.0)),
            Err(DepthError::Parse {
                line: 2,
                message: "Invalid depth: 'x'".to_string(),
            }),
        ];
        let result = BinAggregator::new(BinConfig::new("1", 10))
            .unwrap()
            .aggregate_to_vec(rows);

        assert!(matches!(result, Err(DepthError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_unsorted_stream_rejected() {
        let result = BinAggregator::new(BinConfig::new("1", 10))
            .unwrap()
            .aggregate_to_vec(records(&[(25, 1.0), (3, 1.0)]));

        assert!(matches!(
            result,
            Err(DepthError::Unsorted {
                position: 3,
                cursor: 30
            })
        ));
    }

    #[test]
    fn test_invalid_config() {
        assert!(BinAggregator::new(BinConfig::new("1", 0)).is_err());
        assert!(BinAggregator::new(BinConfig::new("1", 10).with_report_width(0)).is_err());

        let result = BinAggregator::new(BinConfig::new("1", 10).with_report_width(4));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid configuration: report width (4) must divide bin width (10)"
        );
    }

    #[test]
    fn test_sink_error_stops_aggregation() {
        let mut seen = 0;
        let result = BinAggregator::new(BinConfig::new("1", 10))
            .unwrap()
            .aggregate(records(&[(55, 1.0)]), |_| {
                seen += 1;
                if seen == 2 {
                    return Err(DepthError::Io(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "closed",
                    )));
                }
                Ok(())
            });

        assert!(matches!(result, Err(DepthError::Io(_))));
        assert_eq!(seen, 2);
    }
}

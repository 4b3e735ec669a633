//! Core types and algorithms for per-base depth QC.
//!
//! - [`BinAggregator`] turns a sorted per-base depth stream into gapless
//!   fixed-width bins.
//! - [`validate_regions`] and [`compare_paired`] check a candidate coverage
//!   estimate against ground truth, fail-fast and accumulate-and-report
//!   respectively.
//! - [`RegionDepthOracle`] abstracts the external tool that supplies ground
//!   truth per region.

pub mod aggregate;
pub mod compare;
mod depth_bin;
mod error;
pub mod oracle;
mod region;
pub mod scale;

pub use aggregate::{AggregateStats, BinAggregator, BinConfig, DEFAULT_BIN_WIDTH};
pub use compare::{
    compare_paired, validate_regions, PairedSummary, RegionVerdict, ToleranceFailure,
    REGION_TOLERANCE,
};
pub use depth_bin::{Bin, DepthRecord};
pub use error::{DepthError, Result};
pub use oracle::{reduce_depth_output, DepthNormalization, RegionDepthOracle};
pub use region::{Region, RegionRecord};

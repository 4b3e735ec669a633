use depthcore::{reduce_depth_output, DepthError, DepthNormalization, Region, RegionDepthOracle};
use log::debug;
use std::{
    path::{Path, PathBuf},
    process::Command,
};

/// Ground truth from `samtools depth`, run once per region.
///
/// Windowed queries pass `-a` so every position of the region is reported,
/// zeros included. Sparse queries leave it out and only see covered positions.
#[derive(Debug, Clone)]
pub struct SamtoolsDepth {
    executable: PathBuf,
    alignment: PathBuf,
    reference: Option<PathBuf>,
    min_mapq: u8,
}

impl SamtoolsDepth {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(executable: P, alignment: Q) -> Self {
        Self {
            executable: executable.as_ref().to_path_buf(),
            alignment: alignment.as_ref().to_path_buf(),
            reference: None,
            min_mapq: 1,
        }
    }

    pub fn with_min_mapq(mut self, min_mapq: u8) -> Self {
        self.min_mapq = min_mapq;
        self
    }

    /// Reference fasta, needed to decode CRAM alignments.
    pub fn with_reference(mut self, reference: Option<PathBuf>) -> Self {
        self.reference = reference;
        self
    }

    fn args(&self, region: &Region, mode: DepthNormalization) -> Vec<String> {
        let mut args = vec!["depth".to_string()];
        if mode.fill_zero() {
            args.push("-a".to_string());
        }
        args.push("-Q".to_string());
        args.push(self.min_mapq.to_string());
        args.push("-r".to_string());
        args.push(region.to_string());
        if let Some(reference) = &self.reference {
            args.push("--reference".to_string());
            args.push(reference.display().to_string());
        }
        args.push(self.alignment.display().to_string());
        args
    }

    fn command_line(&self, region: &Region, mode: DepthNormalization) -> String {
        let mut parts = vec![self.executable.display().to_string()];
        parts.extend(self.args(region, mode));
        parts.join(" ")
    }
}

impl RegionDepthOracle for SamtoolsDepth {
    fn query_mean_depth(
        &mut self,
        region: &Region,
        mode: DepthNormalization,
    ) -> Result<f64, DepthError> {
        debug!("Running: {}", self.command_line(region, mode));

        let output = Command::new(&self.executable)
            .args(self.args(region, mode))
            .output()
            .map_err(|e| DepthError::OracleInvocation {
                command: self.command_line(region, mode),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                output.status.to_string()
            } else {
                format!("{}: {}", output.status, stderr)
            };
            return Err(DepthError::OracleInvocation {
                command: self.command_line(region, mode),
                message,
            });
        }

        reduce_depth_output(output.stdout.as_slice(), region, mode)
    }

    fn describe(&self, region: &Region, mode: DepthNormalization) -> String {
        self.command_line(region, mode)
    }
}

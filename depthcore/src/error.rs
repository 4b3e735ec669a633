use thiserror::Error;

/// Errors raised while binning depth or comparing coverage estimates.
///
/// Every variant is fatal to the run. Nothing in this crate retries.
#[derive(Debug, Error)]
pub enum DepthError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("Depth stream is not sorted: position {position} falls before bin start {cursor}")]
    Unsorted { position: u64, cursor: u64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "Positions diverge at row {index}: truth start ({truth_start}) != candidate start ({candidate_start})"
    )]
    Alignment {
        index: usize,
        truth_start: u64,
        candidate_start: u64,
    },

    #[error("Failed to run '{command}': {message}")]
    OracleInvocation { command: String, message: String },

    #[error("Unexpected depth output for region {region}: {message}")]
    OracleOutput { region: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Delimited input error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DepthError>;

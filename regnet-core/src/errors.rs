use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegnetError {
    #[error("Invalid interval {chr}:{start}-{end}: start must be strictly less than end")]
    InvalidInterval { chr: String, start: u32, end: u32 },

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("No regulatory region found for gene: {0}")]
    MissingRegion(String),

    #[error("No expression values for: {0}")]
    MissingExpression(String),

    #[error("Dimension mismatch between {left} ({left_len} samples) and {right} ({right_len} samples)")]
    DimensionMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("Both networks are empty, nothing to compare")]
    EmptyNetwork,

    #[error("No intervals loaded: {0}")]
    EmptyIntervalSet(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Error parsing record: {0}")]
    Parse(String),

    #[error("Computation cancelled before {0} was dispatched")]
    Cancelled(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegnetError>;

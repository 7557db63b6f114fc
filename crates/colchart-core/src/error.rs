use thiserror::Error;

/// Errors surfaced to the caller. Arithmetic defects never end up here, they
/// are absorbed where the numbers are read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("No {0} selector configured")]
    MissingSelector(&'static str),

    #[error("Invalid domain [{min}, {max}]: expected min <= 0 <= max")]
    InvalidDomain { min: f64, max: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

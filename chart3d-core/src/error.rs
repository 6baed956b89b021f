/// Error type shared by the chart core
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("Invalid range: min {min} must be finite and not greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("Range has zero length, values cannot be mapped onto it")]
    ZeroLengthRange,

    #[error("Invalid tick size: {0}")]
    InvalidTickSize(f64),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid face: {0}")]
    InvalidFace(String),

    #[error("View point lies inside the scene, the chart box cannot be projected")]
    ViewPointInsideScene,

    #[error("Failed to parse style: {0}")]
    StyleParse(String),

    #[error("Unknown series: {0}")]
    UnknownSeries(String),

    #[error("Duplicate series key: {0}")]
    DuplicateSeries(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;

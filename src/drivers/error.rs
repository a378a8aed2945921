use chrono::NaiveDateTime;
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("series length must be at least 1, got {0}")]
    InvalidSeriesLength(usize),
    #[error("start value must be finite, got {0}")]
    InvalidStartValue(f64),
    #[error("smoothing center of mass must be finite and >= 0, got {0}")]
    InvalidSmoothing(f64),
    #[error("shade interval {begin} .. {end} does not overlap the series range {first} .. {last}")]
    InvalidShadeInterval {
        begin: NaiveDateTime,
        end: NaiveDateTime,
        first: NaiveDateTime,
        last: NaiveDateTime,
    },
    #[error("series `{0}` has no samples")]
    EmptySeries(String),
    #[error("panel count mismatch: expected {expected}, got {actual}")]
    PanelCount { expected: usize, actual: usize },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to render figure: {0}")]
    RenderFailure(String),
}
impl<E> From<DrawingAreaErrorKind<E>> for GraphError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        GraphError::RenderFailure(err.to_string())
    }
}
impl From<image::ImageError> for GraphError {
    fn from(value: image::ImageError) -> Self {
        GraphError::RenderFailure(value.to_string())
    }
}
impl From<std::io::Error> for GraphError {
    fn from(value: std::io::Error) -> Self {
        GraphError::RenderFailure(value.to_string())
    }
}
impl From<serde_json::Error> for GraphError {
    fn from(value: serde_json::Error) -> Self {
        GraphError::Config(value.to_string())
    }
}

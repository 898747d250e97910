use polars::error::PolarsError;

pub type Result<T, E = VizuError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum VizuError {
  #[error("dataset is empty")]
  EmptyDataset,
  #[error("column `{0}` not found")]
  MissingColumn(String),
  #[error("no time columns found (expected column names like \"1980\")")]
  NoTimeColumns,
  #[error("column `{0}` has no numeric time values")]
  NoTimeValues(String),
  #[error("invalid time range: start {start} is after end {end}")]
  InvalidTimeRange { start: i64, end: i64 },
  #[error("invalid option `{name}`: {reason}")]
  InvalidOption { name: &'static str, reason: String },
  #[error("frame {index} is out of range for an animation of {count} frames")]
  FrameOutOfRange { index: usize, count: usize },
  #[error("gpu: {0}")]
  Gpu(String),

  #[error(transparent)]
  Polars(#[from] PolarsError),
  #[error(transparent)]
  Image(#[from] image::ImageError),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

impl VizuError {
  pub(crate) fn option(name: &'static str, reason: impl Into<String>) -> Self {
    VizuError::InvalidOption { name, reason: reason.into() }
  }
}

/// Logs and discards an error, for per-cell failures that shouldn't abort a whole export.
pub(crate) trait ResultExt<T> {
  fn log_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for std::result::Result<T, E> {
  fn log_err(self) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        log::warn!("{e}");
        None
      }
    }
  }
}

//! Animated charts from polars data frames, exported as GIFs.
//!
//! ```no_run
//! use polars::prelude::*;
//! use vizu::Vizu;
//!
//! # fn main() -> vizu::Result<()> {
//! let df = df! {
//!   "city"      => ["Tokyo", "Delhi"],
//!   "continent" => ["Asia", "Asia"],
//!   "1980"      => [28557, 10093],
//!   "2020"      => [37393, 29399],
//! }?;
//!
//! let vizu = Vizu::new(df)?;
//! vizu.bar_chart_race("city", "continent", 1980, 2020).title("Cities").save("race.gif")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use polars::prelude::*;

mod bounds;
mod chart;
mod error;
mod format;
mod interpolate;
mod legend;
mod render;
mod reshape;
mod theme;

pub use bounds::{Bounds, Range};
pub use chart::{
  AnimatedScatter, AnimatedScatterOptions, Bar, BarChartRace, BarChartRaceOptions, BarFrame,
  BarRace, Bubble, ScatterAnimation, ScatterFrame,
};
pub use error::{Result, VizuError};
pub use interpolate::{frame_times, interpolate_linear};
pub use render::{GifSink, RenderConfig, save_gif, write_gif};
pub use reshape::{FrameTable, LongFields, Measure, time_columns, wide_to_long};
pub use theme::GroupColors;

pub(crate) use error::ResultExt;

/// A dataset to animate.
pub struct Vizu {
  df: DataFrame,
}

impl Vizu {
  /// Takes ownership of `df`. A frame without rows or columns is rejected.
  pub fn new(df: DataFrame) -> Result<Vizu> {
    if df.height() == 0 || df.width() == 0 {
      return Err(VizuError::EmptyDataset);
    }
    Ok(Vizu { df })
  }

  /// Reads a CSV file with a header row.
  pub fn from_csv(path: impl AsRef<Path>) -> Result<Vizu> {
    let file = std::fs::File::open(path.as_ref())?;
    let df = CsvReader::new(file).finish()?;
    log::debug!("read {} rows from {}", df.height(), path.as_ref().display());
    Vizu::new(df)
  }

  pub fn data(&self) -> &DataFrame { &self.df }

  /// A bar chart race over wide data: `name_field` labels the bars, `group_field` colours them,
  /// and every column named like a year between `time_start` and `time_end` is a period.
  pub fn bar_chart_race(
    &self,
    name_field: &str,
    group_field: &str,
    time_start: i64,
    time_end: i64,
  ) -> BarChartRace<'_> {
    BarChartRace::new(&self.df, name_field, group_field, time_start, time_end)
  }

  /// An animated scatter over long data, one row per entity per `time_field` value.
  pub fn animated_scatter(
    &self,
    time_field: &str,
    x_field: &str,
    y_field: &str,
    name_field: &str,
    group_field: &str,
  ) -> AnimatedScatter<'_> {
    AnimatedScatter::new(&self.df, time_field, x_field, y_field, name_field, group_field)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_empty_frames() {
    assert!(matches!(Vizu::new(DataFrame::empty()), Err(VizuError::EmptyDataset)));

    let no_rows = df! { "city" => Vec::<String>::new() }.unwrap();
    assert!(matches!(Vizu::new(no_rows), Err(VizuError::EmptyDataset)));
  }

  #[test]
  fn reads_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cities.csv");
    std::fs::write(&path, "city,continent,1980,2000\nTokyo,Asia,28557,34450\nCairo,Africa,8820,\n")
      .unwrap();

    let vizu = Vizu::from_csv(&path).unwrap();
    assert_eq!(vizu.data().shape(), (2, 4));

    let race = vizu.bar_chart_race("city", "continent", 1980, 2000).prepare().unwrap();
    assert_eq!(race.frame_count(), 21);
    let last = race.frame(20).unwrap();
    assert_eq!(last.bars.iter().find(|b| b.name == "Cairo").unwrap().value, 8820.0);
  }

  #[test]
  fn missing_file() {
    assert!(matches!(Vizu::from_csv("/nonexistent/data.csv"), Err(VizuError::Io(_))));
  }
}
